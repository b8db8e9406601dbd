//! Real file and terminal access for guesstree, plus the container that
//! hands configured knowledge and session services to the CLI.

pub mod di;
pub mod error;
pub mod traits;

pub use error::{InfraError, InfraResult};
