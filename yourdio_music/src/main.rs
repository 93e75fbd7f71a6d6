// Yourdio Composer: CLI entry point.
//
// Usage:
//   yourdio compose [--theme FILE] [--output DIR] [--chapters N] [--minutes M]
//   yourdio event <EVENT> [--theme FILE] [--output DIR]
//   yourdio events [EVENT...] [--theme FILE] [--output DIR]
//   yourdio list-events
//   yourdio themes [--dir DIR]
//   yourdio inspect [--theme FILE] [--chapter N] [--chapters N] [--minutes M] [--event EVENT]
//
// Without --theme the built-in default theme is used. Logging goes through
// `tracing`; set RUST_LOG (e.g. `RUST_LOG=debug`) for per-track detail.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use yourdio_music::render::{self, PieceLayout};
use yourdio_music::theme::{self, ThemeConfig};
use yourdio_music::{EventType, assembler};

/// Deterministic ambient composer: prime- and chaos-driven MIDI from YAML themes
#[derive(Parser)]
#[command(name = "yourdio")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a long-form piece, one MIDI file per chapter
    Compose(ComposeArgs),

    /// Render the soundscape for one event type
    Event(EventArgs),

    /// Render soundscapes for several event types (all by default)
    Events(EventsArgs),

    /// List the available event types
    ListEvents,

    /// List YAML themes in a directory
    Themes {
        /// Directory to search
        #[arg(long, default_value = "themes")]
        dir: PathBuf,
    },

    /// Print one assembled chapter or event as JSON
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ThemeArg {
    /// YAML theme file (built-in default when omitted)
    #[arg(short, long)]
    theme: Option<PathBuf>,
}

#[derive(Args)]
struct ComposeArgs {
    #[command(flatten)]
    theme: ThemeArg,

    /// Output directory
    #[arg(short, long, default_value = render::DEFAULT_COMPOSITION_DIR)]
    output: PathBuf,

    /// Number of chapters
    #[arg(long, default_value_t = 12)]
    chapters: usize,

    /// Minutes per chapter
    #[arg(long, default_value_t = 30.0)]
    minutes: f64,
}

#[derive(Args)]
struct EventArgs {
    /// Event type (see `list-events`)
    event: String,

    #[command(flatten)]
    theme: ThemeArg,

    /// Output directory
    #[arg(short, long, default_value = render::DEFAULT_EVENTS_DIR)]
    output: PathBuf,
}

#[derive(Args)]
struct EventsArgs {
    /// Event types to render; all of them when omitted
    events: Vec<String>,

    #[command(flatten)]
    theme: ThemeArg,

    /// Output directory
    #[arg(short, long, default_value = render::DEFAULT_EVENTS_DIR)]
    output: PathBuf,
}

#[derive(Args)]
struct InspectArgs {
    #[command(flatten)]
    theme: ThemeArg,

    /// Chapter index (zero-based)
    #[arg(long, default_value_t = 0)]
    chapter: usize,

    /// Number of chapters in the piece
    #[arg(long, default_value_t = 12)]
    chapters: usize,

    /// Minutes per chapter
    #[arg(long, default_value_t = 30.0)]
    minutes: f64,

    /// Inspect an event soundscape instead of a chapter
    #[arg(long)]
    event: Option<String>,
}

fn load_theme(arg: &ThemeArg) -> Result<ThemeConfig> {
    match &arg.theme {
        Some(path) => {
            ThemeConfig::load(path).with_context(|| format!("loading theme {}", path.display()))
        }
        None => Ok(ThemeConfig::default()),
    }
}

fn compose(args: ComposeArgs) -> Result<()> {
    let theme = load_theme(&args.theme)?;
    let layout = PieceLayout {
        chapters: args.chapters,
        chapter_minutes: args.minutes,
    };
    let written = render::render_composition(&theme, layout, &args.output)?;
    println!(
        "Wrote {} chapters of '{}' to {}",
        written.len(),
        theme.name,
        args.output.display()
    );
    Ok(())
}

fn event(args: EventArgs) -> Result<()> {
    let theme = load_theme(&args.theme)?;
    let event: EventType = args.event.parse()?;
    let path = render::render_event(&theme, event, &args.output)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Parse event names, skipping unknown ones with a warning.
fn parse_events(names: &[String]) -> Vec<EventType> {
    if names.is_empty() {
        return EventType::ALL.to_vec();
    }
    names
        .iter()
        .filter_map(|name| match name.parse::<EventType>() {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("{e}; skipping");
                None
            }
        })
        .collect()
}

fn events(args: EventsArgs) -> Result<()> {
    let theme = load_theme(&args.theme)?;
    let events = parse_events(&args.events);
    let written = render::render_event_set(&theme, &events, &args.output)?;
    println!(
        "Wrote {} soundscapes to {}",
        written.len(),
        args.output.display()
    );
    Ok(())
}

fn list_events() {
    println!("Available event types:");
    for event in EventType::ALL {
        let profile = event.profile();
        println!(
            "  {:<15} {:<30} ({} min)",
            event.name(),
            profile.description,
            profile.duration_minutes
        );
    }
}

fn themes(dir: &Path) -> Result<()> {
    let found = theme::list_themes(dir)
        .with_context(|| format!("listing themes in {}", dir.display()))?;
    if found.is_empty() {
        println!("No themes in {}", dir.display());
        return Ok(());
    }
    for path in found {
        match ThemeConfig::load(&path) {
            Ok(t) => println!(
                "  {:<30} {} ({})",
                t.name,
                t.description.as_deref().unwrap_or(""),
                path.display()
            ),
            Err(e) => warn!(path = %path.display(), "unusable theme: {e}"),
        }
    }
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let theme = load_theme(&args.theme)?;
    let composition = match &args.event {
        Some(name) => assembler::assemble_event(&theme, name.parse()?)?,
        None => assembler::assemble_minutes(&theme, args.chapter, args.chapters, args.minutes)?,
    };
    println!("{}", serde_json::to_string_pretty(&composition)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compose(args) => compose(args),
        Commands::Event(args) => event(args),
        Commands::Events(args) => events(args),
        Commands::ListEvents => {
            list_events();
            Ok(())
        }
        Commands::Themes { dir } => themes(&dir),
        Commands::Inspect(args) => inspect(args),
    }
}
