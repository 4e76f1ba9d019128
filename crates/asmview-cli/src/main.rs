use anyhow::{Context, Result};
use asmview_app::{AssemblyBrowser, BrowserSettings};
use asmview_core::ManifestLoader;
use asmview_events::EventBus;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod tree;
mod walk;

use walk::WalkStep;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Assembly manifest (JSON); repeat to load several assemblies
    #[arg(short, long = "manifest", required = true)]
    manifests: Vec<PathBuf>,

    /// Settings file; defaults to the user config directory
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the type hierarchy with descendant counts
    Tree,
    /// Fuzzy search type names
    Search { query: String },
    /// Replay navigation steps: search, back, forward, graph:<FullName>
    Walk {
        #[arg(required = true)]
        steps: Vec<WalkStep>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let settings = match &args.settings {
        Some(path) => BrowserSettings::load_from(path)?,
        None => BrowserSettings::load(),
    };

    let mut loader = ManifestLoader::new();
    let assemblies = args
        .manifests
        .iter()
        .map(|path| loader.load_path(path))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to load assemblies")?;

    let bus = EventBus::new();
    let mut browser = AssemblyBrowser::new(assemblies, bus.clone(), settings);
    tracing::debug!("{} events queued during load", bus.drain().len());

    match args.command {
        Command::Tree => print!("{}", tree::render_tree(browser.types())),
        Command::Search { query } => {
            browser.search_mut().set_query(query);
            for id in browser.search().results() {
                if let Some(node) = browser.types().get(*id) {
                    println!("{} ({}, {})", node.full_name, node.kind, node.assembly_name);
                }
            }
        }
        Command::Walk { steps } => {
            println!("{}", walk::describe(&browser));
            for step in &steps {
                walk::run_step(&mut browser, step)?;
                println!("{}", walk::describe(&browser));
                for event in bus.drain() {
                    tracing::debug!("{:?}", event);
                }
            }
        }
    }

    Ok(())
}
