//! Derived-type index over the loaded type definitions.
//!
//! The index is rebuilt from scratch whenever the assembly set changes. Building
//! runs two full passes: the link pass records every resolved base → derived
//! edge, and only then the count pass walks the finished adjacency bottom-up to
//! fill in descendant counts.

use asmview_core::{
    AssemblyRef, BaseTypeResolver, LoadedType, LoadedTypesResolver, TypeId, TypeKind,
    TypeReference, flatten_types,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNode {
    pub id: TypeId,
    pub full_name: String,
    pub kind: TypeKind,
    pub assembly_name: String,
    parent: Option<TypeId>,
    derived: Vec<TypeId>,
    descendant_count: usize,
}

impl TypeNode {
    fn new(loaded: &LoadedType) -> Self {
        Self {
            id: loaded.definition.id,
            full_name: loaded.definition.full_name(),
            kind: loaded.definition.kind,
            assembly_name: loaded.assembly_name.clone(),
            parent: None,
            derived: Vec::new(),
            descendant_count: 0,
        }
    }

    /// Base type, if it resolved to a loaded type.
    pub fn parent(&self) -> Option<TypeId> {
        self.parent
    }

    /// Direct derived types, in link order.
    pub fn derived_types(&self) -> &[TypeId] {
        &self.derived
    }

    pub fn descendant_count(&self) -> usize {
        self.descendant_count
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    InProgress,
    Done,
}

#[derive(Debug, Default, Clone)]
pub struct TypeIndex {
    nodes: Vec<TypeNode>,
    positions: HashMap<TypeId, usize>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens the assemblies and builds against the loaded set itself.
    pub fn from_assemblies<'a>(assemblies: impl IntoIterator<Item = &'a AssemblyRef>) -> Self {
        let types = flatten_types(assemblies);
        let resolver = LoadedTypesResolver::new(&types);
        Self::build(&types, &resolver)
    }

    pub fn build<R: BaseTypeResolver + ?Sized>(types: &[LoadedType], resolver: &R) -> Self {
        let mut index = Self::default();
        let mut bases: Vec<Option<&TypeReference>> = Vec::with_capacity(types.len());

        for loaded in types {
            let id = loaded.definition.id;
            if index.positions.contains_key(&id) {
                tracing::warn!(
                    "Duplicate type id {} ({}), keeping the first definition",
                    id,
                    loaded.definition.full_name()
                );
                continue;
            }
            index.positions.insert(id, index.nodes.len());
            index.nodes.push(TypeNode::new(loaded));
            bases.push(loaded.definition.base_type.as_ref());
        }

        index.link(&bases, resolver);
        index.count_descendants();

        tracing::debug!(
            "Built type index: {} types, {} roots",
            index.nodes.len(),
            index.nodes.iter().filter(|n| n.is_root()).count()
        );
        index
    }

    fn link<R: BaseTypeResolver + ?Sized>(
        &mut self,
        bases: &[Option<&TypeReference>],
        resolver: &R,
    ) {
        for (pos, base) in bases.iter().enumerate() {
            let Some(reference) = base else {
                continue;
            };
            let Some(base_id) = resolver.resolve(reference, self.nodes[pos].id.assembly) else {
                continue;
            };
            let Some(&base_pos) = self.positions.get(&base_id) else {
                continue;
            };
            if base_pos == pos {
                continue;
            }
            let child_id = self.nodes[pos].id;
            self.nodes[base_pos].derived.push(child_id);
            self.nodes[pos].parent = Some(base_id);
        }
    }

    fn count_descendants(&mut self) {
        let mut state = vec![Visit::Pending; self.nodes.len()];
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in 0..self.nodes.len() {
            if state[start] != Visit::Pending {
                continue;
            }
            state[start] = Visit::InProgress;
            stack.push((start, 0));

            while let Some(frame) = stack.last_mut() {
                let pos = frame.0;
                if let Some(child_id) = self.nodes[pos].derived.get(frame.1) {
                    frame.1 += 1;
                    let child = self.positions[child_id];
                    match state[child] {
                        Visit::Pending => {
                            state[child] = Visit::InProgress;
                            stack.push((child, 0));
                        }
                        Visit::InProgress => {
                            tracing::warn!(
                                "Inheritance cycle through {}, ignoring the closing edge",
                                self.nodes[child].full_name
                            );
                        }
                        Visit::Done => {}
                    }
                    continue;
                }

                // Edges into a still in-progress node close a cycle and add nothing.
                let count: usize = self.nodes[pos]
                    .derived
                    .iter()
                    .map(|id| self.positions[id])
                    .filter(|&child| state[child] == Visit::Done)
                    .map(|child| 1 + self.nodes[child].descendant_count)
                    .sum();
                self.nodes[pos].descendant_count = count;
                state[pos] = Visit::Done;
                stack.pop();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeNode> {
        self.positions.get(&id).map(|&pos| &self.nodes[pos])
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.positions.contains_key(&id)
    }

    /// All nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeNode> {
        self.nodes.iter()
    }

    pub fn roots(&self) -> impl Iterator<Item = &TypeNode> {
        self.nodes.iter().filter(|n| n.is_root())
    }

    pub fn derived_types(&self, id: TypeId) -> &[TypeId] {
        self.get(id).map(TypeNode::derived_types).unwrap_or_default()
    }

    pub fn descendant_count(&self, id: TypeId) -> Option<usize> {
        self.get(id).map(TypeNode::descendant_count)
    }

    pub fn parent(&self, id: TypeId) -> Option<TypeId> {
        self.get(id).and_then(TypeNode::parent)
    }

    /// Base chain of `id`, nearest first. Stops early on a cycle.
    pub fn ancestors(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if ancestor == id || chain.contains(&ancestor) {
                break;
            }
            chain.push(ancestor);
            current = self.parent(ancestor);
        }
        chain
    }

    pub fn find_by_full_name(&self, full_name: &str) -> Option<&TypeNode> {
        self.nodes.iter().find(|n| n.full_name == full_name)
    }
}
