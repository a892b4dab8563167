//! Core data model and persistent graph store for the code-intelligence engine.

pub mod change;
pub mod ignore_rules;
pub mod model;
pub mod store;
pub mod symbols;


pub use change::{ChangeEvent, ChangeScope};
pub use ignore_rules::IgnoreRules;
pub use model::{Edge, EdgeId, EdgeKind, Language, Node, NodeId, NodeKind, Visibility};
pub use store::{Store, StoreError};
pub use symbols::SymbolTable;
