use asmview_core::{TypeId, TypeKind};
use asmview_index::TypeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeIndex(pub usize);

impl fmt::Display for EdgeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    Ancestor,
    Focus,
    Derived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Levels of derived types shown below the focused type.
    pub max_derived_depth: usize,
    pub show_ancestors: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            max_derived_depth: 2,
            show_ancestors: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: TypeId,
    pub name: String,
    pub kind: TypeKind,
    pub role: NodeRole,
    /// Negative above the focus, positive below it.
    pub depth: i32,
    pub descendant_count: usize,
    /// Derived types exist beyond the depth limit.
    pub truncated: bool,
}

/// Inheritance edge, pointing from base to derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEdge {
    pub base: NodeIndex,
    pub derived: NodeIndex,
}

/// The inheritance neighbourhood of one type: its base chain above, its
/// derived types below.
#[derive(Debug, Default, Clone)]
pub struct HierarchyGraph {
    nodes: Vec<HierarchyNode>,
    edges: Vec<HierarchyEdge>,
    node_map: HashMap<TypeId, NodeIndex>,
    focus: Option<NodeIndex>,
}

impl HierarchyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph around `focus`. A type missing from the index yields an
    /// empty graph.
    pub fn build(index: &TypeIndex, focus: TypeId, settings: &GraphSettings) -> Self {
        let mut graph = Self::new();
        let Some(focus_node) = index.get(focus) else {
            tracing::warn!("Type {} is not in the index, showing an empty graph", focus);
            return graph;
        };

        let mut previous = None;
        if settings.show_ancestors {
            let ancestors = index.ancestors(focus);
            let levels = ancestors.len() as i32;
            for (i, ancestor) in ancestors.iter().rev().enumerate() {
                let idx = graph.add_type(index, *ancestor, NodeRole::Ancestor, i as i32 - levels);
                if let Some(base) = previous {
                    graph.add_edge(base, idx);
                }
                previous = Some(idx);
            }
        }

        let focus_idx = graph.add_type(index, focus_node.id, NodeRole::Focus, 0);
        if let Some(base) = previous {
            graph.add_edge(base, focus_idx);
        }
        graph.focus = Some(focus_idx);

        let mut queue = VecDeque::from([(focus, focus_idx, 0usize)]);
        while let Some((id, idx, depth)) = queue.pop_front() {
            let derived = index.derived_types(id);
            if derived.is_empty() {
                continue;
            }
            if depth >= settings.max_derived_depth {
                graph.nodes[idx.0].truncated = true;
                continue;
            }
            for child in derived {
                if graph.node_map.contains_key(child) {
                    continue;
                }
                let child_idx =
                    graph.add_type(index, *child, NodeRole::Derived, depth as i32 + 1);
                graph.add_edge(idx, child_idx);
                queue.push_back((*child, child_idx, depth + 1));
            }
        }

        graph
    }

    fn add_type(&mut self, index: &TypeIndex, id: TypeId, role: NodeRole, depth: i32) -> NodeIndex {
        let (name, kind, descendant_count) = index
            .get(id)
            .map(|n| (n.full_name.clone(), n.kind, n.descendant_count()))
            .unwrap_or_else(|| (id.to_string(), TypeKind::Class, 0));
        let idx = NodeIndex(self.nodes.len());
        self.nodes.push(HierarchyNode {
            id,
            name,
            kind,
            role,
            depth,
            descendant_count,
            truncated: false,
        });
        self.node_map.insert(id, idx);
        idx
    }

    fn add_edge(&mut self, base: NodeIndex, derived: NodeIndex) -> EdgeIndex {
        let idx = EdgeIndex(self.edges.len());
        self.edges.push(HierarchyEdge { base, derived });
        idx
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn focus(&self) -> Option<&HierarchyNode> {
        self.focus.map(|idx| &self.nodes[idx.0])
    }

    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[HierarchyEdge] {
        &self.edges
    }

    pub fn node_index(&self, id: TypeId) -> Option<NodeIndex> {
        self.node_map.get(&id).copied()
    }

    pub fn node_weight(&self, index: NodeIndex) -> Option<&HierarchyNode> {
        self.nodes.get(index.0)
    }
}

impl Index<NodeIndex> for HierarchyGraph {
    type Output = HierarchyNode;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl Index<EdgeIndex> for HierarchyGraph {
    type Output = HierarchyEdge;
    fn index(&self, index: EdgeIndex) -> &Self::Output {
        &self.edges[index.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asmview_core::{AssemblyId, LoadedType, LoadedTypesResolver, TypeDefinition, TypeReference};

    fn id(token: u32) -> TypeId {
        TypeId::new(AssemblyId(0), token)
    }

    /// Object <- Control <- Button <- ToggleButton <- CheckBox
    ///                   <- Label
    fn widgets() -> TypeIndex {
        let rows = [
            (1, "Object", None),
            (2, "Control", Some("Object")),
            (3, "Button", Some("Control")),
            (4, "ToggleButton", Some("Button")),
            (5, "CheckBox", Some("ToggleButton")),
            (6, "Label", Some("Control")),
        ];
        let types: Vec<LoadedType> = rows
            .iter()
            .map(|(token, name, base)| LoadedType {
                assembly_name: "Widgets".into(),
                definition: TypeDefinition {
                    id: id(*token),
                    namespace: String::new(),
                    name: name.to_string(),
                    kind: TypeKind::Class,
                    base_type: base.map(TypeReference::new),
                },
            })
            .collect();
        TypeIndex::build(&types, &LoadedTypesResolver::new(&types))
    }

    #[test]
    fn test_graph_around_middle_type() {
        let index = widgets();
        let graph = HierarchyGraph::build(&index, id(3), &GraphSettings::default());

        let names: Vec<(&str, i32)> = graph
            .nodes()
            .iter()
            .map(|n| (n.name.as_str(), n.depth))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Object", -2),
                ("Control", -1),
                ("Button", 0),
                ("ToggleButton", 1),
                ("CheckBox", 2),
            ]
        );
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.focus().unwrap().descendant_count, 2);
        assert!(graph.nodes().iter().all(|n| !n.truncated));
    }

    #[test]
    fn test_depth_limit_marks_truncated_nodes() {
        let index = widgets();
        let settings = GraphSettings {
            max_derived_depth: 1,
            show_ancestors: false,
        };
        let graph = HierarchyGraph::build(&index, id(2), &settings);

        let control = graph.node_index(id(2)).unwrap();
        let button = graph.node_index(id(3)).unwrap();
        assert_eq!(graph[control].role, NodeRole::Focus);
        assert!(graph[button].truncated);
        assert!(!graph[graph.node_index(id(6)).unwrap()].truncated);
        assert!(graph.node_index(id(1)).is_none());
        assert!(graph.node_index(id(4)).is_none());
        assert_eq!(graph[EdgeIndex(0)], HierarchyEdge { base: control, derived: button });
    }

    #[test]
    fn test_unknown_type_gives_empty_graph() {
        let graph = HierarchyGraph::build(&widgets(), id(99), &GraphSettings::default());
        assert!(graph.is_empty());
        assert!(graph.focus().is_none());
    }

    #[test]
    fn test_settings_fill_missing_fields() {
        let settings: GraphSettings =
            serde_json::from_str(r#"{ "max_derived_depth": 5 }"#).unwrap();
        assert_eq!(settings.max_derived_depth, 5);
        assert!(settings.show_ancestors);
    }
}
