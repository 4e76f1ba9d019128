use anyhow::{Result, anyhow, bail};
use asmview_app::{AssemblyBrowser, NavigationItem, ScreenKind};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkStep {
    Search,
    Graph(String),
    Back,
    Forward,
}

impl FromStr for WalkStep {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "search" => Ok(WalkStep::Search),
            "back" => Ok(WalkStep::Back),
            "forward" => Ok(WalkStep::Forward),
            _ => match s.strip_prefix("graph:") {
                Some(name) if !name.is_empty() => Ok(WalkStep::Graph(name.to_string())),
                _ => bail!(
                    "Unknown step '{s}' (expected search, back, forward or graph:<FullName>)"
                ),
            },
        }
    }
}

pub fn run_step(browser: &mut AssemblyBrowser, step: &WalkStep) -> Result<()> {
    match step {
        WalkStep::Search => browser.show_search(),
        WalkStep::Graph(name) => {
            let id = browser
                .types()
                .find_by_full_name(name)
                .map(|node| node.id)
                .ok_or_else(|| anyhow!("No loaded type named {name}"))?;
            browser.show_graph(id);
        }
        WalkStep::Back => {
            browser.navigate_back();
        }
        WalkStep::Forward => {
            browser.navigate_forward();
        }
    }
    Ok(())
}

/// One status line: what is showing and which arrows are enabled.
pub fn describe(browser: &AssemblyBrowser) -> String {
    let showing = match browser.current_item() {
        NavigationItem::Screen(ScreenKind::Search) => "search".to_string(),
        NavigationItem::Screen(ScreenKind::Graph) => "graph".to_string(),
        NavigationItem::Type(id) => match browser.types().get(id) {
            Some(node) => format!("graph {}", node.full_name),
            None => format!("graph {id} (unloaded)"),
        },
    };
    let arrow = |enabled: bool, label: &str| {
        if enabled {
            label.to_string()
        } else {
            "-".repeat(label.len())
        }
    };
    format!(
        "{showing:<40} [{}|{}]",
        arrow(browser.can_navigate_back(), "back"),
        arrow(browser.can_navigate_forward(), "forward")
    )
}
