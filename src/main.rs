use clap::{Parser, Subcommand};
use stargazer::archive::{metadata_last, Archive, BuildOptions, EntryOrder};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stargazer", version, about = "A tool to handle PSX STAR files")]
struct Cli {
    /// Do not print any messages
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Unpack files from a STAR file
    #[command(alias = "u")]
    Unpack {
        /// Path to STAR file
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory. Defaults to '<input file without extension>_extracted'
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Pack a folder into a STAR file
    #[command(alias = "p")]
    Pack {
        /// Path to a folder
        #[arg(short, long)]
        input: PathBuf,
        /// Output STAR file. Defaults to '<input folder>_packed.star'
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Store metadata.xml/metadata.txt and install.txt after all other files
        #[arg(long)]
        metadata_last: bool,
    },
    /// Show information about a STAR file
    #[command(alias = "i")]
    Info {
        /// Path to STAR file
        #[arg(short, long)]
        input: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {

        // ── Unpack ───────────────────────────────────────────────────────────
        Commands::Unpack { input, output } => {
            let archive = Archive::open(&input)?;
            let output = output.unwrap_or_else(|| default_unpack_dir(&input));
            info!("Will unpack to '{}'", output.display());
            archive.unpack(&output)?;
            info!("Unpacked {} file(s)", archive.len());
        }

        // ── Pack ─────────────────────────────────────────────────────────────
        Commands::Pack { input, output, metadata_last: last } => {
            let output = output.unwrap_or_else(|| default_pack_file(&input));
            info!("Will pack to '{}'", output.display());
            info!("Reading '{}'...", input.display());
            let opts = BuildOptions {
                order: if last { Some(metadata_last as EntryOrder) } else { None },
            };
            let archive = Archive::from_directory_with(&input, opts)?;
            info!("Writing to '{}'...", output.display());
            let written = archive.write_to_path(&output)?;
            info!("Packed {} file(s), {} bytes", archive.len(), written);
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input, json } => {
            let summary = Archive::open(&input)?.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{summary}");
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn init_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// `<input file name without extension>_extracted`, in the working directory.
fn default_unpack_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "star".into());
    PathBuf::from(format!("{stem}_extracted"))
}

/// `<input folder name>_packed.star`, in the working directory.
fn default_pack_file(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "star".into());
    PathBuf::from(format!("{name}_packed.star"))
}
