//! Boxflow CLI
//!
//! Lays out a JSON box document and prints the resulting geometry.
//!
//! - boxflow page.json                 # Print the box tree
//! - boxflow page.json --json          # Print geometry as JSON
//! - boxflow page.json --width 640     # Override the viewport width

mod document;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use boxflow_common::warning::clear_warnings;
use boxflow_layout::{BoxGeometry, LayoutConfig, LayoutContext};
use clap::Parser;
use owo_colors::OwoColorize;

use document::Document;

/// Boxflow: CSS 2.1 block, inline and float layout for box documents
#[derive(Parser, Debug)]
#[command(name = "boxflow")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the laid-out box tree
    boxflow demos/sample.json

    # Geometry as JSON
    boxflow demos/sample.json --json

    # Narrow viewport with a custom configuration
    boxflow demos/sample.json --width 320 --config layout.json
"#)]
struct Cli {
    /// Path to the JSON box document
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Viewport width (default: the document's viewport)
    #[arg(long)]
    width: Option<f32>,

    /// Viewport height (default: the document's viewport)
    #[arg(long)]
    height: Option<f32>,

    /// JSON file with layout tunables
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print geometry as JSON instead of a tree
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.path)
        .with_context(|| format!("cannot read {}", cli.path.display()))?;
    let doc: Document = serde_json::from_str(&source)
        .with_context(|| format!("invalid document {}", cli.path.display()))?;
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LayoutConfig::default(),
    };

    let width = cli.width.unwrap_or(doc.viewport.width);
    let height = cli.height.unwrap_or(doc.viewport.height);

    clear_warnings();
    let mut tree = doc.build(width, height)?;
    tree.layout(&LayoutContext::new(config))?;
    let geometry = tree.geometry();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&geometry)?);
    } else {
        println!(
            "{}",
            format!("=== Layout Tree (viewport: {width}x{height}) ===").bold()
        );
        print_geometry(&geometry, 0);
    }
    Ok(())
}

/// Read layout tunables from a JSON file
fn load_config(path: &Path) -> anyhow::Result<LayoutConfig> {
    let source =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("invalid config {}", path.display()))
}

/// Recursively print a box with its margin and content rectangles
fn print_geometry(geometry: &BoxGeometry, depth: usize) {
    let indent = "  ".repeat(depth);
    let b = geometry.bounds;
    let c = geometry.content;
    print!("{indent}{} {}", geometry.label.cyan(), geometry.id.dimmed());
    if let Some(text) = &geometry.text {
        print!(" {}", format!("{text:?}").green());
    }
    println!();
    println!(
        "{indent}  margin box: x={:.1} y={:.1} w={:.1} h={:.1}",
        b.x, b.y, b.width, b.height
    );
    if c != b {
        println!(
            "{indent}  content:    x={:.1} y={:.1} w={:.1} h={:.1}",
            c.x, c.y, c.width, c.height
        );
    }
    for child in &geometry.children {
        print_geometry(child, depth + 1);
    }
}
