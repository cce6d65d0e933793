//! CLI tool for moving the content of one PowerPoint deck into another's design.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use restyle_core::{
    extract_deck, DeckFile, DeckRole, MarkerKind, MergeConfig, MergeMode, PlacementStrategy,
    Progress, ReconcileAction, SlideContent, SlideStatus, TruncatePolicy,
};
use restyle_pptx::PptxDeck;
use std::path::{Path, PathBuf};

/// Re-skin PowerPoint decks: put the text of one deck into the design of another.
#[derive(Parser, Debug)]
#[command(name = "ppt-restyle")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge the content of a source deck into a template deck
    Merge(MergeArgs),

    /// Print the content a merge would carry over from a deck
    Extract(ExtractArgs),
}

#[derive(clap::Args, Debug)]
struct MergeArgs {
    /// Deck whose text is carried over (.pptx)
    source: PathBuf,

    /// Deck whose design is used (.pptx)
    template: PathBuf,

    /// Where to write the merged deck (overwritten)
    output: PathBuf,

    /// Merge mode (default: styled)
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Reapply the source's paragraph and run formatting
    #[arg(long)]
    preserve_formatting: bool,

    /// How source text is matched to template regions
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// What to do with kept slides when the template is longer
    #[arg(long, value_enum)]
    truncate: Option<TruncateArg>,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Font size in points for titles and first elements
    #[arg(long)]
    title_size: Option<f64>,

    /// Font size in points for body text
    #[arg(long)]
    body_size: Option<f64>,

    /// Lightweight mode only clears text shorter than this
    #[arg(long)]
    max_placeholder_len: Option<usize>,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::Args, Debug)]
struct ExtractArgs {
    /// Deck to read (.pptx)
    deck: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Include paragraph formatting and picture/table regions
    #[arg(long)]
    detailed: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Styled,
    Lightweight,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Positional,
    Overlap,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TruncateArg {
    KeepSlides,
    BareLayouts,
}

impl From<ModeArg> for MergeMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Styled => MergeMode::Styled,
            ModeArg::Lightweight => MergeMode::Lightweight,
        }
    }
}

impl From<StrategyArg> for PlacementStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Positional => PlacementStrategy::Positional,
            StrategyArg::Overlap => PlacementStrategy::Overlap,
        }
    }
}

impl From<TruncateArg> for TruncatePolicy {
    fn from(arg: TruncateArg) -> Self {
        match arg {
            TruncateArg::KeepSlides => TruncatePolicy::KeepSlides,
            TruncateArg::BareLayouts => TruncatePolicy::BareLayouts,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Merge(args) => {
            init_logging(args.verbose);
            run_merge(&args)
        }
        Command::Extract(args) => {
            init_logging(args.verbose);
            run_extract(&args)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run_merge(args: &MergeArgs) -> Result<()> {
    let config = build_config(args)?;

    if !args.quiet {
        eprintln!(
            "Merging {} into {} ({} mode)",
            args.source.display(),
            args.template.display(),
            mode_name(config.mode)
        );
    }

    let quiet = args.quiet;
    restyle_pptx::merge_files(
        &args.source,
        &args.template,
        &args.output,
        &config,
        &mut |event: &Progress| {
            if !quiet {
                eprintln!("{}", describe(event));
            }
        },
    )
    .with_context(|| format!("Failed to produce {}", args.output.display()))?;

    if !args.quiet {
        println!("Done! Written to: {}", args.output.display());
    }
    Ok(())
}

/// Configuration file (or defaults) with command line flags applied on top.
fn build_config(args: &MergeArgs) -> Result<MergeConfig> {
    let mut config = match &args.config {
        Some(path) => MergeConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MergeConfig::default(),
    };

    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if args.preserve_formatting {
        config.preserve_formatting = true;
    }
    if let Some(strategy) = args.strategy {
        config.strategy = strategy.into();
    }
    if let Some(truncate) = args.truncate {
        config.truncate = truncate.into();
    }
    if let Some(size) = args.title_size {
        config.title_font_size_pt = size;
    }
    if let Some(size) = args.body_size {
        config.body_font_size_pt = size;
    }
    if let Some(len) = args.max_placeholder_len {
        config.placeholder_max_len = len;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let deck = PptxDeck::open(&args.deck)
        .with_context(|| format!("Failed to read {}", args.deck.display()))?;
    let contents = extract_deck(&deck, args.detailed);

    if args.json {
        let json = serde_json::to_string_pretty(&contents).context("Failed to serialize")?;
        println!("{}", json);
    } else {
        print!("{}", format_contents(&args.deck, &contents));
    }
    Ok(())
}

fn format_contents(path: &Path, contents: &[SlideContent]) -> String {
    let mut out = format!("{}: {} slides\n", path.display(), contents.len());
    for content in contents {
        out.push_str(&format!(
            "\nSlide {} ({} elements)\n",
            content.index + 1,
            content.element_count()
        ));
        for record in &content.records {
            let marker = if record.is_title { "T" } else { "-" };
            for (i, line) in record.text.lines().enumerate() {
                let lead = if i == 0 { marker } else { " " };
                out.push_str(&format!("  {} {}\n", lead, line));
            }
        }
        for region in &content.markers {
            let kind = match region.kind {
                MarkerKind::Pictorial => "picture",
                MarkerKind::Tabular => "table",
            };
            out.push_str(&format!(
                "  [{} at {},{} size {}x{}]\n",
                kind,
                region.geometry.left,
                region.geometry.top,
                region.geometry.width,
                region.geometry.height
            ));
        }
    }
    out
}

fn describe(event: &Progress) -> String {
    match event {
        Progress::DeckLoaded { role, slides } => {
            let role = match role {
                DeckRole::Source => "Source",
                DeckRole::Template => "Template",
            };
            format!("{} deck loaded: {} slides", role, slides)
        }
        Progress::SlideExtracted { slide, elements } => {
            format!("  Slide {}: extracted {} elements", slide + 1, elements)
        }
        Progress::Reconciled(plan) => match plan.action {
            ReconcileAction::None => format!("Slide count matches: {}", plan.final_count),
            ReconcileAction::Append { count } => {
                format!("Added {} slides, now {}", count, plan.final_count)
            }
            ReconcileAction::Truncate { keep } => format!("Kept the first {} slides", keep),
        },
        Progress::SlideProcessed {
            slide,
            cleared,
            written,
            status,
        } => {
            let status = match status {
                SlideStatus::Filled => format!("filled {} regions", written),
                SlideStatus::NoContent => "no content".to_string(),
                SlideStatus::NoDestination => "no text region to fill".to_string(),
                SlideStatus::Cleaned => "cleaned".to_string(),
            };
            format!(
                "  Slide {}: cleared {} placeholders, {}",
                slide + 1,
                cleared,
                status
            )
        }
        Progress::Saved { path, bytes } => {
            format!("Saved {} ({} bytes)", path.display(), bytes)
        }
    }
}

fn mode_name(mode: MergeMode) -> &'static str {
    match mode {
        MergeMode::Styled => "styled",
        MergeMode::Lightweight => "lightweight",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restyle_core::{ContentRecord, Geometry, Reconciliation, RegionMarker};

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("restyle.json");
        std::fs::write(
            &config_path,
            r#"{"title_font_size_pt": 40, "body_font_size_pt": 20, "truncate": "bare-layouts"}"#,
        )
        .unwrap();

        let args = Args::parse_from([
            "ppt-restyle",
            "merge",
            "a.pptx",
            "b.pptx",
            "c.pptx",
            "--config",
            config_path.to_str().unwrap(),
            "--body-size",
            "16",
            "--mode",
            "lightweight",
            "--strategy",
            "overlap",
        ]);
        let Command::Merge(merge) = args.command else {
            panic!("expected merge");
        };
        let config = build_config(&merge).unwrap();

        assert_eq!(config.title_font_size_pt, 40.0);
        assert_eq!(config.body_font_size_pt, 16.0);
        assert_eq!(config.truncate, TruncatePolicy::BareLayouts);
        assert_eq!(config.mode, MergeMode::Lightweight);
        assert_eq!(config.strategy, PlacementStrategy::Overlap);
        assert!(!config.preserve_formatting);
    }

    #[test]
    fn test_invalid_size_is_rejected() {
        let args = Args::parse_from([
            "ppt-restyle",
            "merge",
            "a.pptx",
            "b.pptx",
            "c.pptx",
            "--title-size",
            "0",
        ]);
        let Command::Merge(merge) = args.command else {
            panic!("expected merge");
        };
        assert!(build_config(&merge).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from([
            "ppt-restyle",
            "merge",
            "a.pptx",
            "b.pptx",
            "c.pptx",
            "-q",
            "-v",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_describe_events() {
        let event = Progress::Reconciled(Reconciliation {
            final_count: 5,
            action: ReconcileAction::Append { count: 2 },
        });
        assert_eq!(describe(&event), "Added 2 slides, now 5");

        let event = Progress::SlideProcessed {
            slide: 0,
            cleared: 2,
            written: 1,
            status: SlideStatus::Filled,
        };
        assert_eq!(
            describe(&event),
            "  Slide 1: cleared 2 placeholders, filled 1 regions"
        );
    }

    #[test]
    fn test_format_contents() {
        let mut content = SlideContent::new(0);
        content.records.push(ContentRecord::new(
            "Agenda",
            true,
            Geometry::new(0, 0, 100, 50),
        ));
        content.records.push(ContentRecord::new(
            "One\nTwo",
            false,
            Geometry::new(0, 60, 100, 50),
        ));
        content.markers.push(RegionMarker {
            kind: MarkerKind::Pictorial,
            geometry: Geometry::new(10, 20, 30, 40),
        });

        let text = format_contents(Path::new("deck.pptx"), &[content]);
        assert_eq!(
            text,
            "deck.pptx: 1 slides\n\nSlide 1 (3 elements)\n  T Agenda\n  - One\n    Two\n  [picture at 10,20 size 30x40]\n"
        );
    }
}
