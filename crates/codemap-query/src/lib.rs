//! Query engine: six read-only operations plus the `reindex_project`
//! mutator, as pure functions over a `&Store` reference.

pub mod callstack;
pub mod dependencies;
pub mod error;
pub mod impact;
pub mod references;
pub mod reindex;
pub mod response;
pub mod search;
pub mod summary;
pub mod tools;
