use asmview_core::TypeId;
use asmview_events::ScreenKind;
use serde::{Deserialize, Serialize};

/// One step of browsing history: a fixed screen, or the graph of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationItem {
    Screen(ScreenKind),
    Type(TypeId),
}

impl NavigationItem {
    pub fn is_screen(&self) -> bool {
        matches!(self, NavigationItem::Screen(_))
    }

    pub fn screen(&self) -> Option<ScreenKind> {
        match self {
            NavigationItem::Screen(kind) => Some(*kind),
            NavigationItem::Type(_) => None,
        }
    }

    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            NavigationItem::Type(id) => Some(*id),
            NavigationItem::Screen(_) => None,
        }
    }
}

/// Back and forward stacks. The current item lives outside, in whatever screen
/// is active; every transition takes it as an argument.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NavigationHistory {
    back: Vec<NavigationItem>,
    forward: Vec<NavigationItem>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordinary navigation away from `current`.
    pub fn push(&mut self, current: NavigationItem) {
        self.back.push(current);
        self.forward.clear();
    }

    /// Leave `current` for the most recent back entry.
    pub fn back(&mut self, current: NavigationItem) -> Option<NavigationItem> {
        let target = self.back.pop()?;
        self.forward.push(current);
        Some(target)
    }

    /// Leave `current` for the most recent forward entry.
    pub fn forward(&mut self, current: NavigationItem) -> Option<NavigationItem> {
        let target = self.forward.pop()?;
        self.back.push(current);
        Some(target)
    }

    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    /// Back stack, oldest first.
    pub fn back_entries(&self) -> &[NavigationItem] {
        &self.back
    }

    /// Forward stack, furthest first.
    pub fn forward_entries(&self) -> &[NavigationItem] {
        &self.forward
    }

    /// Drop type entries for which `keep` is false. Entries that only became
    /// neighbours because stale ones between them were dropped collapse into
    /// one, and so does a stack top that now equals `current`. Set
    /// `current_replaced` when `current` took the place of a dropped item.
    ///
    /// Returns the number of stale entries removed.
    pub fn retain_types(
        &mut self,
        current: NavigationItem,
        current_replaced: bool,
        mut keep: impl FnMut(TypeId) -> bool,
    ) -> usize {
        let (back_stale, back_gap) = prune_stack(&mut self.back, &mut keep);
        let (forward_stale, forward_gap) = prune_stack(&mut self.forward, &mut keep);
        if back_gap || current_replaced {
            pop_if_top(&mut self.back, current);
        }
        if forward_gap || current_replaced {
            pop_if_top(&mut self.forward, current);
        }
        back_stale + forward_stale
    }

    pub fn clear(&mut self) {
        self.back.clear();
        self.forward.clear();
    }
}

/// Returns the stale count and whether the top of the stack was dropped.
fn prune_stack(
    stack: &mut Vec<NavigationItem>,
    keep: &mut impl FnMut(TypeId) -> bool,
) -> (usize, bool) {
    let mut stale = 0;
    let mut gap = false;
    let mut kept: Vec<NavigationItem> = Vec::with_capacity(stack.len());
    for item in stack.drain(..) {
        if item.type_id().is_some_and(|id| !keep(id)) {
            stale += 1;
            gap = true;
            continue;
        }
        if !(gap && kept.last() == Some(&item)) {
            kept.push(item);
        }
        gap = false;
    }
    *stack = kept;
    (stale, gap)
}

fn pop_if_top(stack: &mut Vec<NavigationItem>, item: NavigationItem) {
    if stack.last() == Some(&item) {
        stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asmview_core::AssemblyId;

    fn ty(token: u32) -> NavigationItem {
        NavigationItem::Type(TypeId::new(AssemblyId(0), token))
    }

    const SEARCH: NavigationItem = NavigationItem::Screen(ScreenKind::Search);

    #[test]
    fn test_item_discriminant_is_derived() {
        assert!(SEARCH.is_screen());
        assert_eq!(SEARCH.type_id(), None);
        assert!(!ty(1).is_screen());
        assert_eq!(ty(1).screen(), None);
    }

    #[test]
    fn test_push_clears_forward() {
        let mut history = NavigationHistory::new();
        history.push(SEARCH);
        assert_eq!(history.back(ty(1)), Some(SEARCH));
        assert!(history.can_go_forward());

        history.push(SEARCH);
        assert!(!history.can_go_forward());
        assert_eq!(history.back_entries(), &[SEARCH]);
    }

    #[test]
    fn test_back_and_forward_swap_current() {
        let mut history = NavigationHistory::new();
        history.push(SEARCH);
        history.push(ty(1));
        // current: ty(2)

        assert_eq!(history.back(ty(2)), Some(ty(1)));
        assert_eq!(history.back(ty(1)), Some(SEARCH));
        assert_eq!(history.back(SEARCH), None);
        assert_eq!(history.forward_entries(), &[ty(2), ty(1)]);

        assert_eq!(history.forward(SEARCH), Some(ty(1)));
        assert_eq!(history.back_entries(), &[SEARCH]);
        assert_eq!(history.forward_entries(), &[ty(2)]);
    }

    #[test]
    fn test_empty_stacks_are_no_ops() {
        let mut history = NavigationHistory::new();
        assert_eq!(history.back(SEARCH), None);
        assert_eq!(history.forward(SEARCH), None);
        assert!(!history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_retain_types_prunes_and_collapses() {
        let mut history = NavigationHistory::new();
        history.push(SEARCH);
        history.push(ty(1));
        history.push(SEARCH);
        history.push(ty(2));
        history.forward.push(ty(1));

        let removed = history.retain_types(ty(3), false, |id| id.token != 1);

        // [Search, T1, Search, T2] -> [Search, Search, T2] -> [Search, T2]
        assert_eq!(removed, 2);
        assert_eq!(history.back_entries(), &[SEARCH, ty(2)]);
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_retain_types_keeps_repeated_visits() {
        let mut history = NavigationHistory::new();
        history.push(SEARCH);
        history.push(ty(1));
        history.push(ty(1));
        history.forward.push(ty(2));
        history.forward.push(ty(2));

        let removed = history.retain_types(ty(1), false, |_| true);

        assert_eq!(removed, 0);
        assert_eq!(history.back_entries(), &[SEARCH, ty(1), ty(1)]);
        assert_eq!(history.forward_entries(), &[ty(2), ty(2)]);
    }

    #[test]
    fn test_retain_types_collapses_top_onto_current() {
        let mut history = NavigationHistory::new();
        history.push(SEARCH);
        history.push(ty(2));
        history.push(ty(1));
        // current: ty(2)

        assert_eq!(history.retain_types(ty(2), false, |id| id.token != 1), 1);
        assert_eq!(history.back_entries(), &[SEARCH]);
    }

    #[test]
    fn test_replaced_current_drops_matching_tops() {
        let mut history = NavigationHistory::new();
        history.push(SEARCH);
        // current ty(1) was dropped and Search took its place
        history.forward.push(SEARCH);

        assert_eq!(history.retain_types(SEARCH, true, |id| id.token != 1), 0);
        assert!(!history.can_go_back());
        assert!(!history.can_go_forward());
    }
}
