//! Domain layer: the knowledge-tree engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod codec;
pub mod definition;
pub mod display;
pub mod error;
pub mod leaf_index;
pub mod node;
pub mod tree;

pub use arena::{ArenaOptions, Block, SlabArena};
pub use codec::CodecOptions;
pub use definition::{DefinitionCursor, Property};
pub use display::TreeDisplay;
pub use error::{DomainError, DomainResult};
pub use leaf_index::{IndexSlot, LeafIndex, SlotLookup};
pub use node::{Node, NodeId, NodeStore};
pub use tree::{Branch, Cursor, KnowledgeBase, Slot};
