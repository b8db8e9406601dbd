//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Console)
//! but are themselves concrete structs, not traits.

pub mod knowledge;
pub mod session;

pub use knowledge::{Definition, ExportFormat, KnowledgeService, KnowledgeStats};
pub use session::{SessionCommand, SessionService};
