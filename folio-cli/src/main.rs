//! Folio CLI
//!
//! Lays out a JSON-described document into pages and prints the geometry
//! of every box, or the recorded drawing commands.

mod input;
mod report;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use folio_css::paint::{NoEvents, OverlayText, PAGE_COUNT, PAGE_NUM};
use folio_css::style::FontSubtype;
use folio_css::style::values::ColorValue;
use folio_css::{
    ApproximateFontMetrics, DisplayListCanvas, FontRegistry, LayoutConfig, LayoutResult, NoImages,
    Orientation, PageTextOverlay, PaperSize, Renderer, layout_with_declarations,
};

use input::InputDocument;
use report::{DisplayListReport, JsonReport};

/// Folio: paginated HTML/CSS layout
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the boxes of every page
    folio report.json

    # US letter, landscape, machine readable
    folio --paper letter --landscape --json report.json

    # Recorded drawing commands with page numbers in the footer
    folio --display-list --page-numbers report.json

    # Layout options from a file (any LayoutConfig field)
    folio --config print.json report.json
"#)]
struct Cli {
    /// Document tree with per-element declarations
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Paper size (a3, a4, a5, letter, legal, tabloid)
    #[arg(long, value_name = "SIZE")]
    paper: Option<PaperSize>,

    /// Swap the paper's width and height
    #[arg(long)]
    landscape: bool,

    /// JSON file with layout options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print JSON instead of a tree
    #[arg(long)]
    json: bool,

    /// Render and print the display list instead of box geometry
    #[arg(long)]
    display_list: bool,

    /// Stamp "Page N of M" at the bottom of every page (with --display-list)
    #[arg(long)]
    page_numbers: bool,

    /// Never color the output
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let document = InputDocument::load(&cli.input)?
        .into_document(cli.input.parent().filter(|p| !p.as_os_str().is_empty()))?;
    log::info!(
        "laying out {} ({} nodes)",
        cli.input.display(),
        document.dom.len()
    );

    let fonts = FontRegistry::with_core_fonts("times");
    let metrics = ApproximateFontMetrics::default();
    let result = layout_with_declarations(
        document.dom,
        &document.declarations,
        document.base_url,
        &config,
        &fonts,
        &metrics,
        &NoImages,
    )
    .with_context(|| format!("laying out {}", cli.input.display()))?;

    let color = !cli.no_color && std::io::stdout().is_terminal();
    let warnings: Vec<_> = result.warnings.iter().cloned().collect();

    if cli.display_list {
        let overlay = if cli.page_numbers {
            page_number_overlay(&config, &fonts)?
        } else {
            PageTextOverlay::new()
        };
        let renderer = Renderer::new(&config, &fonts, &metrics, &NoImages).with_overlay(&overlay);
        let mut canvas = DisplayListCanvas::new();
        renderer.render(&result, &mut canvas, &mut NoEvents)?;
        let report = DisplayListReport {
            pages: canvas.pages(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if cli.json {
        let report = JsonReport::new(&result, &warnings, config.page_size());
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    } else {
        print!("{}", report::format_pages(&result, config.page_size(), color));
    }

    let stderr_color = !cli.no_color && std::io::stderr().is_terminal();
    eprint!("{}", report::format_warnings(&warnings, stderr_color));
    summarize(&result, &cli.input);
    Ok(())
}

/// Defaults, then the config file, then flags.
fn load_config(cli: &Cli) -> Result<LayoutConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(paper) = cli.paper {
        config.paper = paper;
        config.page_size = None;
    }
    if cli.landscape {
        config.orientation = Orientation::Landscape;
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<LayoutConfig> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// "Page N of M" centred in the bottom margin.
fn page_number_overlay(config: &LayoutConfig, fonts: &FontRegistry) -> Result<PageTextOverlay> {
    let (width, height) = config.page_size();
    let size = 9.0;
    let template = format!("Page {PAGE_NUM} of {PAGE_COUNT}");
    let font = fonts.resolve(&[config.default_font_family.clone()], FontSubtype::Normal)?;
    let mut overlay = PageTextOverlay::new();
    overlay.add(OverlayText {
        x: width / 2.0 - 30.0,
        y: height - config.margins.bottom / 2.0 - size / 2.0,
        template,
        font,
        size,
        color: ColorValue::BLACK,
    });
    Ok(overlay)
}

fn summarize(result: &LayoutResult, input: &Path) {
    log::info!(
        "{}: {} page(s), {} warning(s)",
        input.display(),
        result.page_count,
        result.warnings.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "page_size": [300.0, 200.0], "dpi": 72.0 }}"#).unwrap();
        let cli = Cli::parse_from([
            "folio",
            "--config",
            file.path().to_str().unwrap(),
            "--landscape",
            "in.json",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.dpi, 72.0);
        assert_eq!(config.page_size(), (200.0, 300.0));

        let cli = Cli::parse_from([
            "folio",
            "--config",
            file.path().to_str().unwrap(),
            "--paper",
            "letter",
            "in.json",
        ]);
        assert_eq!(load_config(&cli).unwrap().page_size(), (612.0, 792.0));
    }

    #[test]
    fn test_page_number_overlay_uses_default_family() {
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let overlay = page_number_overlay(&config, &fonts).unwrap();
        assert!(!overlay.is_empty());
    }
}
