mod adjacency;
mod affinity;

pub use adjacency::{AdjacencyMatrix, AdjacencySearch, Contiguity};
pub use affinity::AffinityMatrix;
