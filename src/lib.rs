//! Organizational chart tree with invariant-preserving reparenting.
//!
//! The core is [`domain::OrgTree`]: a chart built once from a flat node list,
//! mutated only by [`domain::OrgTree::reparent`], and read through depth-first
//! traversals. Collapse flags live in a separate [`domain::ViewState`].
//!
//! ```
//! use orgchart::domain::{DomainError, NodeId, NodeRecord, OrgTree};
//!
//! let mut tree = OrgTree::from_records(
//!     vec![
//!         NodeRecord::new("DIRETORIA", "DIRETORIA").with_subordinates([1, 2]),
//!         NodeRecord::new(1, "DIRETOR 1").with_subordinates([14]),
//!         NodeRecord::new(2, "DIRETOR 2"),
//!         NodeRecord::new(14, "Kaesyo"),
//!     ],
//!     &NodeId::from("DIRETORIA"),
//! )?;
//!
//! tree.reparent(&NodeId::from(14), &NodeId::from(2))?;
//! assert_eq!(tree.children_of(&NodeId::from(2))?, vec![NodeId::from(14)]);
//!
//! let err = tree.reparent(&NodeId::from(2), &NodeId::from(14)).unwrap_err();
//! assert!(matches!(err, DomainError::Cycle { .. }));
//! # Ok::<(), DomainError>(())
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
