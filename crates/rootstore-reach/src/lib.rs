//! Reachability index for rootstore.
//!
//! Repositories share one content-addressed pool, so "the objects of a
//! repository" is not a storage fact but a graph property: everything that
//! can be reached from the repository's references. [`compute`] walks the
//! commit/tree/tag graph from a set of seeds and returns a
//! [`ReachabilitySet`] partitioned by object kind.

pub mod error;
pub mod set;
pub mod walk;

pub use error::{ReachError, ReachResult, Referrer};
pub use set::ReachabilitySet;
pub use walk::{compute, Seed};
