//! Seams between the browser and the screens it drives.

use asmview_core::TypeId;
use asmview_graph::GraphScreen;
use asmview_index::TypeIndex;
use asmview_search::SearchScreen;

pub trait SearchCollaborator {
    /// The assembly set changed; drop any cached index or filter state.
    fn notify_assemblies_changed(&mut self, index: &TypeIndex);

    /// Re-showing search while it is already active.
    fn focus_search_field(&mut self);
}

pub trait GraphCollaborator {
    fn show(&mut self, type_id: TypeId, index: &TypeIndex);

    fn current_type(&self) -> Option<TypeId>;

    /// The index was rebuilt while this screen stayed on top.
    fn refresh(&mut self, _index: &TypeIndex) {}
}

impl SearchCollaborator for SearchScreen {
    fn notify_assemblies_changed(&mut self, index: &TypeIndex) {
        self.reindex(index);
    }

    fn focus_search_field(&mut self) {
        SearchScreen::focus_search_field(self);
    }
}

impl GraphCollaborator for GraphScreen {
    fn show(&mut self, type_id: TypeId, index: &TypeIndex) {
        GraphScreen::show(self, type_id, index);
    }

    fn current_type(&self) -> Option<TypeId> {
        GraphScreen::current_type(self)
    }

    fn refresh(&mut self, index: &TypeIndex) {
        GraphScreen::refresh(self, index);
    }
}
