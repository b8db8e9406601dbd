//! guesstree: a twenty-questions knowledge engine.
//!
//! The knowledge base is a full binary decision tree: interior nodes hold
//! yes/no questions, leaves hold subjects. Wrong guesses are turned into new
//! questions via [`domain::Cursor::learn`]. Subjects are indexed by name in a
//! binary search tree and all text lives in a slab arena owned by the
//! knowledge base.
//!
//! Layers, innermost first: `domain` (pure, never prints), `application`
//! (services over I/O traits), `infrastructure` (real I/O, wiring) and `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
