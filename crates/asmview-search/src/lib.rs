use asmview_core::TypeId;
use asmview_events::{Event, EventBus};
use asmview_index::TypeIndex;
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32String};
use std::collections::HashSet;

pub const DEFAULT_RESULT_LIMIT: usize = 20;

/// The search screen: a fuzzy filter over the full names of every indexed type.
///
/// The symbol cache mirrors the type index and must be refreshed through
/// [`SearchScreen::reindex`] whenever the assembly set changes.
pub struct SearchScreen {
    matcher: Matcher,
    // (normalized full name, type id)
    symbols: Vec<(Utf32String, TypeId)>,
    query: String,
    results: Vec<TypeId>,
    result_limit: usize,
    focus_requests: usize,
    event_bus: EventBus,
}

impl SearchScreen {
    pub fn new(event_bus: EventBus) -> Self {
        Self::with_result_limit(event_bus, DEFAULT_RESULT_LIMIT)
    }

    pub fn with_result_limit(event_bus: EventBus, result_limit: usize) -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
            symbols: Vec::new(),
            query: String::new(),
            results: Vec::new(),
            result_limit,
            focus_requests: 0,
            event_bus,
        }
    }

    /// Rebuild the symbol cache from `index` and rerun the current query, so no
    /// cached result outlives its type.
    pub fn reindex(&mut self, index: &TypeIndex) {
        self.symbols = index
            .iter()
            .map(|node| (Utf32String::from(node.full_name.as_str()), node.id))
            .collect();
        let query = std::mem::take(&mut self.query);
        self.set_query(query);
        tracing::debug!("Search cache refreshed with {} types", self.symbols.len());
    }

    pub fn focus_search_field(&mut self) {
        self.focus_requests += 1;
        self.event_bus.publish(Event::SearchFieldFocused);
    }

    /// How many times the search field has been asked to take focus.
    pub fn focus_requests(&self) -> usize {
        self.focus_requests
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        let query = self.query.clone();
        self.results = self.search_symbol(&query);
    }

    pub fn results(&self) -> &[TypeId] {
        &self.results
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Fuzzy type-name search, best match first, capped at the result limit.
    pub fn search_symbol(&mut self, query: &str) -> Vec<TypeId> {
        if query.is_empty() {
            return Vec::new();
        }

        let pattern = Pattern::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );

        let mut matches = Vec::new();
        for (name, id) in &self.symbols {
            if let Some(score) = pattern.score(name.slice(..), &mut self.matcher) {
                matches.push((*id, score));
            }
        }

        // Stable sort keeps declaration order among equal scores.
        matches.sort_by(|a, b| b.1.cmp(&a.1));

        let mut seen = HashSet::new();
        matches
            .into_iter()
            .filter(|(id, _)| seen.insert(*id))
            .map(|(id, _)| id)
            .take(self.result_limit)
            .collect()
    }
}
