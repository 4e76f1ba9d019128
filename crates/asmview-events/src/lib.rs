use asmview_core::TypeId;
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// The closed set of screens the browser can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ScreenKind {
    #[default]
    Search,
    Graph,
}

impl ScreenKind {
    /// Whether assemblies may be dropped onto (and removed from) the window
    /// while this screen is showing.
    pub fn allows_assembly_drop(self) -> bool {
        matches!(self, ScreenKind::Search)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    // Assemblies
    AssembliesChanged {
        assembly_count: usize,
        type_count: usize,
    },

    // Navigation
    NavigationStateChanged {
        can_navigate_back: bool,
        can_navigate_forward: bool,
    },
    ScreenChanged {
        screen: ScreenKind,
    },
    /// History entries dropped because their type left the index.
    HistoryPruned {
        removed: usize,
    },

    // Screens
    SearchFieldFocused,
    GraphShown {
        type_id: TypeId,
    },
}

/// Handle to the UI loop's event queue. Passed explicitly to whatever needs to
/// signal the shell.
#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        tracing::trace!("publish {:?}", event);
        let _ = self.tx.send(event);
    }

    /// Drain everything queued so far.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }

    /// Hand every queued event to `listener`, oldest first, without blocking.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// A shell component that reacts to browser events, e.g. the back/forward
/// buttons.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use asmview_core::AssemblyId;

    #[test]
    fn test_sender_and_receiver_share_the_queue() {
        let bus = EventBus::new();
        let sender = bus.sender();
        let receiver = bus.receiver();

        sender
            .send(Event::GraphShown {
                type_id: TypeId::new(AssemblyId(3), 0x0200_0004),
            })
            .unwrap();

        match receiver.recv().unwrap() {
            Event::GraphShown { type_id } => {
                assert_eq!(type_id.assembly, AssemblyId(3));
                assert_eq!(type_id.token, 0x0200_0004);
            }
            other => panic!("Expected GraphShown, got {other:?}"),
        }
    }

    #[derive(Default)]
    struct NavigationButtons {
        back_enabled: bool,
        forward_enabled: bool,
        updates: usize,
    }

    impl EventListener for NavigationButtons {
        fn handle_event(&mut self, event: &Event) {
            if let Event::NavigationStateChanged {
                can_navigate_back,
                can_navigate_forward,
            } = event
            {
                self.back_enabled = *can_navigate_back;
                self.forward_enabled = *can_navigate_forward;
                self.updates += 1;
            }
        }
    }

    #[test]
    fn test_dispatch_to_listener_keeps_last_state() {
        let bus = EventBus::new();
        bus.publish(Event::NavigationStateChanged {
            can_navigate_back: true,
            can_navigate_forward: false,
        });
        bus.publish(Event::SearchFieldFocused);
        bus.publish(Event::NavigationStateChanged {
            can_navigate_back: false,
            can_navigate_forward: true,
        });

        let mut buttons = NavigationButtons::default();
        bus.dispatch_to(&mut buttons);

        assert_eq!(buttons.updates, 2);
        assert!(!buttons.back_enabled);
        assert!(buttons.forward_enabled);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_only_search_screen_accepts_assembly_drop() {
        assert!(ScreenKind::Search.allows_assembly_drop());
        assert!(!ScreenKind::Graph.allows_assembly_drop());
    }
}
