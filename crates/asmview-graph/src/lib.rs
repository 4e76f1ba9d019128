pub mod graph;
pub mod screen;

pub use graph::{
    EdgeIndex, GraphSettings, HierarchyEdge, HierarchyGraph, HierarchyNode, NodeIndex, NodeRole,
};
pub use screen::GraphScreen;
