/// In-memory node and edge storage.
pub mod store;

/// Animated, cancellable BFS/DFS over the store.
pub mod traversal;

pub use store::{GraphStore, SharedStore};
pub use traversal::{TraversalEngine, TraversalRequest, TraversalRun, TraversalSummary};
