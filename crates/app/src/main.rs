use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use sban_midi_core::{
    export_animation, from_braille, from_morse, from_number, load_track, save_track, to_morse,
    AppConfig, ExportSettings, ImageExport, MorseAlphabet, NoteTrack, Progress, SbanMidiError,
};
use tracing_subscriber::EnvFilter;

mod encoder;

use encoder::FileEncoder;

fn main() -> sban_midi_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::FromNumber { text, output, unit } => {
            let unit = unit.unwrap_or(config.text.unit_duration);
            write_track(&from_number(&text, unit)?, &output)
        }
        Commands::FromMorse {
            text,
            output,
            unit,
            dit,
            dah,
            space,
        } => {
            let unit = unit.unwrap_or(config.text.unit_duration);
            let defaults = config.text.morse;
            let alphabet = MorseAlphabet {
                dit: dit.unwrap_or(defaults.dit),
                dah: dah.unwrap_or(defaults.dah),
                space: space.unwrap_or(defaults.space),
            };
            write_track(&from_morse(&text, unit, &alphabet)?, &output)
        }
        Commands::FromBraille { text, output, unit } => {
            let unit = unit.unwrap_or(config.text.unit_duration);
            write_track(&from_braille(&text, unit)?, &output)
        }
        Commands::ToMorse { input, unit } => {
            let track = load_track(&input)?;
            println!("{}", to_morse(&track, unit.unwrap_or(config.text.unit_duration)));
            Ok(())
        }
        Commands::Reverse { input, output } => {
            let mut track = load_track(&input)?;
            track.reverse();
            write_track(&track, &output)
        }
        Commands::Image {
            input,
            dir,
            ticks_per_dot,
            progress,
            name,
        } => {
            let settings = with_overrides(config.render.image_settings(), ticks_per_dot, progress);
            let name = name.unwrap_or_else(today_stem);
            run_image(&input, &dir, &name, &settings)
        }
        Commands::Gif {
            input,
            output,
            ticks_per_dot,
            progress,
        } => {
            let settings =
                with_overrides(config.render.animation_settings(), ticks_per_dot, progress);
            run_gif(&input, &output, &settings)
        }
        Commands::Dump { input } => {
            let track = load_track(&input)?;
            println!("{}", serde_json::to_string_pretty(&track)?);
            Ok(())
        }
    }
}

fn with_overrides(
    mut settings: ExportSettings,
    ticks_per_dot: Option<u64>,
    progress: Option<ProgressArg>,
) -> ExportSettings {
    if let Some(ticks_per_dot) = ticks_per_dot {
        settings.ticks_per_dot = ticks_per_dot;
    }
    if let Some(progress) = progress {
        settings.progress = progress.into();
    }
    settings
}

/// Default image stem: today's local date, e.g. `2024-05-01`.
fn today_stem() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn write_track(track: &NoteTrack, output: &Path) -> sban_midi_core::Result<()> {
    tracing::info!(notes = track.len(), ticks = track.max_stop(), ?output, "writing track");
    save_track(track, output)
}

fn run_image(
    input: &Path,
    dir: &Path,
    name: &str,
    settings: &ExportSettings,
) -> sban_midi_core::Result<()> {
    let encoder = FileEncoder;
    let mut export = ImageExport::new(dir, name, &encoder)?;
    let track = load_track(input)?;
    export.export(&track, settings)?;
    Ok(())
}

fn run_gif(input: &Path, output: &Path, settings: &ExportSettings) -> sban_midi_core::Result<()> {
    if settings.progress == Progress::None {
        return Err(SbanMidiError::InvalidInput("animations need the line or point mode"));
    }
    let track = load_track(input)?;
    if !export_animation(&track, output, settings, &FileEncoder)? {
        tracing::warn!(?output, "track too short for an animation, nothing written");
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert between text, MIDI files and piano-roll images", long_about = None)]
struct Cli {
    /// JSON file overriding the default settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Turn digits and letters into a MIDI file.
    FromNumber {
        text: String,
        #[arg(short, long)]
        output: PathBuf,
        /// Note length in ticks.
        #[arg(short, long)]
        unit: Option<u64>,
    },
    /// Turn Morse code into a MIDI file.
    FromMorse {
        #[arg(allow_hyphen_values = true)]
        text: String,
        #[arg(short, long)]
        output: PathBuf,
        /// Dit length in ticks.
        #[arg(short, long)]
        unit: Option<u64>,
        /// Characters read as dits.
        #[arg(long)]
        dit: Option<String>,
        /// Characters read as dahs.
        #[arg(long)]
        dah: Option<String>,
        /// Characters read as spaces.
        #[arg(long)]
        space: Option<String>,
    },
    /// Turn Braille cells into a MIDI file.
    FromBraille {
        text: String,
        #[arg(short, long)]
        output: PathBuf,
        /// Ticks per half cell.
        #[arg(short, long)]
        unit: Option<u64>,
    },
    /// Print a MIDI file as Morse code.
    ToMorse {
        input: PathBuf,
        /// Notes longer than this many ticks read as dahs.
        #[arg(short, long)]
        unit: Option<u64>,
    },
    /// Mirror a MIDI file in time.
    Reverse {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Render a MIDI file to PNG images in a directory.
    Image {
        input: PathBuf,
        dir: PathBuf,
        #[arg(short, long)]
        ticks_per_dot: Option<u64>,
        #[arg(short, long, value_enum)]
        progress: Option<ProgressArg>,
        /// File name stem of the written images [default: today's date].
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Render a MIDI file to an animated GIF.
    Gif {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long)]
        ticks_per_dot: Option<u64>,
        #[arg(short, long, value_enum)]
        progress: Option<ProgressArg>,
    },
    /// Print the notes of a MIDI file as JSON.
    Dump { input: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProgressArg {
    None,
    Line,
    Point,
}

impl From<ProgressArg> for Progress {
    fn from(value: ProgressArg) -> Self {
        match value {
            ProgressArg::None => Progress::None,
            ProgressArg::Line => Progress::Line,
            ProgressArg::Point => Progress::Point,
        }
    }
}
