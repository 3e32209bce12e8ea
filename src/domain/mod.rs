//! Domain layer: chart entities and tree logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod tree;
pub mod view;

pub use entities::*;
pub use error::{DomainError, TreeResult};
pub use tree::{NodeRef, OrgNode, OrgTree, PostOrderIterator, Traverse};
pub use view::ViewState;
