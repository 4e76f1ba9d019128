use crate::graph::{GraphSettings, HierarchyGraph};
use asmview_core::TypeId;
use asmview_events::{Event, EventBus};
use asmview_index::TypeIndex;

/// The graph screen: shows the hierarchy centered on one type at a time.
pub struct GraphScreen {
    current: Option<TypeId>,
    graph: HierarchyGraph,
    settings: GraphSettings,
    event_bus: EventBus,
}

impl GraphScreen {
    pub fn new(event_bus: EventBus, settings: GraphSettings) -> Self {
        Self {
            current: None,
            graph: HierarchyGraph::new(),
            settings,
            event_bus,
        }
    }

    pub fn show(&mut self, type_id: TypeId, index: &TypeIndex) {
        self.current = Some(type_id);
        self.graph = HierarchyGraph::build(index, type_id, &self.settings);
        self.event_bus.publish(Event::GraphShown { type_id });
    }

    pub fn current_type(&self) -> Option<TypeId> {
        self.current
    }

    pub fn graph(&self) -> &HierarchyGraph {
        &self.graph
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Rebuild the graph for the type already shown, after the index changed.
    pub fn refresh(&mut self, index: &TypeIndex) {
        if let Some(type_id) = self.current {
            self.graph = HierarchyGraph::build(index, type_id, &self.settings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asmview_core::{
        AssemblyDefinition, AssemblyId, ModuleDefinition, TypeDefinition, TypeKind, TypeReference,
    };
    use std::sync::Arc;

    fn shapes() -> Arc<AssemblyDefinition> {
        let class = |token: u32, name: &str, base: Option<&str>| TypeDefinition {
            id: TypeId::new(AssemblyId(0), token),
            namespace: "Shapes".into(),
            name: name.into(),
            kind: TypeKind::Class,
            base_type: base.map(TypeReference::new),
        };
        Arc::new(AssemblyDefinition {
            id: AssemblyId(0),
            name: "Shapes".into(),
            modules: vec![ModuleDefinition {
                name: "Shapes.dll".into(),
                types: vec![
                    class(1, "Shape", None),
                    class(2, "Circle", Some("Shapes.Shape")),
                ],
            }],
        })
    }

    #[test]
    fn test_show_switches_type_and_publishes() {
        let bus = EventBus::new();
        let index = TypeIndex::from_assemblies([&shapes()]);
        let mut screen = GraphScreen::new(bus.clone(), GraphSettings::default());
        assert_eq!(screen.current_type(), None);

        let circle = TypeId::new(AssemblyId(0), 2);
        screen.show(circle, &index);

        assert_eq!(screen.current_type(), Some(circle));
        assert_eq!(screen.graph().node_count(), 2);
        assert_eq!(bus.drain(), vec![Event::GraphShown { type_id: circle }]);
    }

    #[test]
    fn test_refresh_after_type_disappears() {
        let index = TypeIndex::from_assemblies([&shapes()]);
        let mut screen = GraphScreen::new(EventBus::new(), GraphSettings::default());
        let shape = TypeId::new(AssemblyId(0), 1);
        screen.show(shape, &index);

        screen.refresh(&TypeIndex::new());

        assert_eq!(screen.current_type(), Some(shape));
        assert!(screen.graph().is_empty());
    }
}
