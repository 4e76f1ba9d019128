use crate::collaborators::{GraphCollaborator, SearchCollaborator};
use crate::navigation::{NavigationHistory, NavigationItem};
use crate::settings::BrowserSettings;
use asmview_core::{AssemblyId, AssemblyRef, LoadedType, LoadedTypesResolver, TypeId, flatten_types};
use asmview_events::{Event, EventBus, ScreenKind};
use asmview_graph::GraphScreen;
use asmview_index::TypeIndex;
use asmview_search::SearchScreen;

const TITLE: &str = "Assembly Browser";

enum ActiveScreen<G> {
    Search,
    Graph(G),
}

impl<G> ActiveScreen<G> {
    fn kind(&self) -> ScreenKind {
        match self {
            ActiveScreen::Search => ScreenKind::Search,
            ActiveScreen::Graph(_) => ScreenKind::Graph,
        }
    }
}

/// Owns the loaded assemblies, the type index built over them, the screens and
/// the navigation history that moves between those screens.
///
/// Every mutation runs to completion on the caller's thread. Changes that the
/// shell has to reflect (enabled navigation arrows, the active screen, the
/// assembly list) are published on the [`EventBus`] passed in at construction.
pub struct AssemblyBrowser<S = SearchScreen, G = GraphScreen> {
    assemblies: Vec<AssemblyRef>,
    all_types: Vec<LoadedType>,
    index: TypeIndex,
    search: S,
    active: ActiveScreen<G>,
    make_graph: Box<dyn FnMut() -> G>,
    history: NavigationHistory,
    settings: BrowserSettings,
    event_bus: EventBus,
}

impl AssemblyBrowser<SearchScreen, GraphScreen> {
    pub fn new(
        assemblies: impl IntoIterator<Item = AssemblyRef>,
        event_bus: EventBus,
        settings: BrowserSettings,
    ) -> Self {
        let search =
            SearchScreen::with_result_limit(event_bus.clone(), settings.search_result_limit);
        let graph_bus = event_bus.clone();
        let graph_settings = settings.graph.clone();
        Self::with_collaborators(
            assemblies,
            search,
            move || GraphScreen::new(graph_bus.clone(), graph_settings.clone()),
            event_bus,
            settings,
        )
    }
}

impl<S: SearchCollaborator, G: GraphCollaborator> AssemblyBrowser<S, G> {
    /// `make_graph` is called each time the graph screen is entered from
    /// another screen.
    pub fn with_collaborators(
        assemblies: impl IntoIterator<Item = AssemblyRef>,
        search: S,
        make_graph: impl FnMut() -> G + 'static,
        event_bus: EventBus,
        settings: BrowserSettings,
    ) -> Self {
        let mut unique: Vec<AssemblyRef> = Vec::new();
        for assembly in assemblies {
            if !unique.iter().any(|a| a.id == assembly.id) {
                unique.push(assembly);
            }
        }

        let mut browser = Self {
            assemblies: unique,
            all_types: Vec::new(),
            index: TypeIndex::new(),
            search,
            active: ActiveScreen::Search,
            make_graph: Box::new(make_graph),
            history: NavigationHistory::new(),
            settings,
            event_bus,
        };
        browser.on_assemblies_changed();
        browser
    }

    // ------------------------------------------------------------------------
    // Assemblies
    // ------------------------------------------------------------------------

    pub fn assemblies(&self) -> &[AssemblyRef] {
        &self.assemblies
    }

    pub fn contains_assembly(&self, id: AssemblyId) -> bool {
        self.assemblies.iter().any(|a| a.id == id)
    }

    /// Every type definition of every loaded assembly, in load order.
    pub fn all_type_definitions(&self) -> &[LoadedType] {
        &self.all_types
    }

    pub fn types(&self) -> &TypeIndex {
        &self.index
    }

    /// Adds the assemblies not loaded yet and rebuilds once. Returns whether
    /// anything was added.
    pub fn add_assemblies(&mut self, assemblies: impl IntoIterator<Item = AssemblyRef>) -> bool {
        let mut added = 0;
        for assembly in assemblies {
            if self.contains_assembly(assembly.id) {
                continue;
            }
            self.assemblies.push(assembly);
            added += 1;
        }
        if added == 0 {
            tracing::debug!("No new assemblies to add");
            return false;
        }

        self.on_assemblies_changed();
        true
    }

    pub fn add_assembly(&mut self, assembly: AssemblyRef) -> bool {
        if self.contains_assembly(assembly.id) {
            tracing::debug!("Assembly {} already loaded", assembly.name);
            return false;
        }

        self.assemblies.push(assembly);
        self.on_assemblies_changed();
        true
    }

    pub fn remove_assembly(&mut self, id: AssemblyId) -> bool {
        let Some(pos) = self.assemblies.iter().position(|a| a.id == id) else {
            tracing::debug!("Assembly {} is not loaded", id);
            return false;
        };

        self.assemblies.remove(pos);
        self.on_assemblies_changed();
        true
    }

    fn on_assemblies_changed(&mut self) {
        self.all_types = flatten_types(&self.assemblies);
        let resolver = LoadedTypesResolver::new(&self.all_types);
        self.index = TypeIndex::build(&self.all_types, &resolver);
        self.search.notify_assemblies_changed(&self.index);
        self.revalidate_screens();

        tracing::info!(
            "Assembly set changed: {} assemblies, {} types",
            self.assemblies.len(),
            self.index.len()
        );
        self.event_bus.publish(Event::AssembliesChanged {
            assembly_count: self.assemblies.len(),
            type_count: self.index.len(),
        });
    }

    fn revalidate_screens(&mut self) {
        if !self.settings.prune_stale_history {
            if let ActiveScreen::Graph(graph) = &mut self.active {
                graph.refresh(&self.index);
            }
            return;
        }

        let mut shown_type_removed = false;
        if let ActiveScreen::Graph(graph) = &mut self.active {
            match graph.current_type() {
                Some(id) if !self.index.contains(id) => shown_type_removed = true,
                _ => graph.refresh(&self.index),
            }
        }
        if shown_type_removed {
            tracing::info!("Shown type is no longer loaded, returning to search");
            self.set_active(ActiveScreen::Search);
        }

        let current = self.current_item();
        let (back_before, forward_before) = (
            self.history.back_entries().len(),
            self.history.forward_entries().len(),
        );
        let index = &self.index;
        let removed = self
            .history
            .retain_types(current, shown_type_removed, |id| index.contains(id));
        let history_changed = back_before != self.history.back_entries().len()
            || forward_before != self.history.forward_entries().len();

        if removed > 0 {
            tracing::debug!("Pruned {} stale history entries", removed);
            self.event_bus.publish(Event::HistoryPruned { removed });
        }
        if history_changed || shown_type_removed {
            self.refresh_navigation_commands();
        }
    }

    // ------------------------------------------------------------------------
    // Screens
    // ------------------------------------------------------------------------

    pub fn title(&self) -> &'static str {
        TITLE
    }

    pub fn show_navigation_arrows(&self) -> bool {
        true
    }

    pub fn active_screen(&self) -> ScreenKind {
        self.active.kind()
    }

    /// Assemblies can be dropped in or removed only while search is showing.
    pub fn assemblies_editable(&self) -> bool {
        self.active_screen().allows_assembly_drop()
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut S {
        &mut self.search
    }

    pub fn graph(&self) -> Option<&G> {
        match &self.active {
            ActiveScreen::Graph(graph) => Some(graph),
            ActiveScreen::Search => None,
        }
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    fn set_active(&mut self, screen: ActiveScreen<G>) {
        let changed = screen.kind() != self.active.kind();
        self.active = screen;
        if changed {
            self.event_bus.publish(Event::ScreenChanged {
                screen: self.active.kind(),
            });
        }
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// The item describing what is on screen right now.
    pub fn current_item(&self) -> NavigationItem {
        match &self.active {
            ActiveScreen::Graph(graph) => graph
                .current_type()
                .map(NavigationItem::Type)
                .unwrap_or(NavigationItem::Screen(ScreenKind::Graph)),
            ActiveScreen::Search => NavigationItem::Screen(ScreenKind::Search),
        }
    }

    fn set_current_item(&mut self, item: NavigationItem) {
        match item {
            NavigationItem::Screen(ScreenKind::Search) => self.set_active(ActiveScreen::Search),
            NavigationItem::Screen(ScreenKind::Graph) => self.enter_graph(),
            NavigationItem::Type(id) => {
                self.enter_graph();
                if let ActiveScreen::Graph(graph) = &mut self.active {
                    graph.show(id, &self.index);
                }
            }
        }
    }

    fn enter_graph(&mut self) {
        if !matches!(self.active, ActiveScreen::Graph(_)) {
            let graph = (self.make_graph)();
            self.set_active(ActiveScreen::Graph(graph));
        }
    }

    pub fn show_search(&mut self) {
        self.navigate(NavigationItem::Screen(ScreenKind::Search));
    }

    pub fn show_graph(&mut self, type_id: TypeId) {
        self.navigate(NavigationItem::Type(type_id));
    }

    pub fn navigate(&mut self, item: NavigationItem) {
        if let NavigationItem::Screen(kind) = item
            && kind == self.active_screen()
        {
            tracing::debug!("{:?} screen already active, focusing it", kind);
            if kind == ScreenKind::Search {
                self.search.focus_search_field();
            }
            return;
        }

        let current = self.current_item();
        self.history.push(current);
        self.set_current_item(item);
        self.refresh_navigation_commands();
    }

    pub fn navigate_back(&mut self) -> bool {
        let current = self.current_item();
        let Some(target) = self.history.back(current) else {
            tracing::debug!("Back history is empty");
            return false;
        };

        self.set_current_item(target);
        self.refresh_navigation_commands();
        true
    }

    pub fn navigate_forward(&mut self) -> bool {
        let current = self.current_item();
        let Some(target) = self.history.forward(current) else {
            tracing::debug!("Forward history is empty");
            return false;
        };

        self.set_current_item(target);
        self.refresh_navigation_commands();
        true
    }

    pub fn can_navigate_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_navigate_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    fn refresh_navigation_commands(&self) {
        self.event_bus.publish(Event::NavigationStateChanged {
            can_navigate_back: self.can_navigate_back(),
            can_navigate_forward: self.can_navigate_forward(),
        });
    }
}
