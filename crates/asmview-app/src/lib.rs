//! Navigation and state coordination for the assembly browser.
//!
//! [`AssemblyBrowser`] owns the loaded assemblies and rebuilds the type index
//! whenever they change; [`NavigationHistory`] holds the back/forward stacks
//! that move between the search screen and per-type graph screens.

pub mod browser;
pub mod collaborators;
pub mod navigation;
pub mod settings;

pub use asmview_events::ScreenKind;
pub use browser::AssemblyBrowser;
pub use collaborators::{GraphCollaborator, SearchCollaborator};
pub use navigation::{NavigationHistory, NavigationItem};
pub use settings::BrowserSettings;
