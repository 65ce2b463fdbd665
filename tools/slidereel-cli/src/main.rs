//! SlideReel CLI: turn a narrated slide list into an editable sequence.
//!
//! Usage:
//!   slidereel build <PATH>       Write the xmeml sequence for a project
//!   slidereel validate <PATH>    Check slides and assets without writing
//!   slidereel info <PATH>        Show the per-track placement table
//!   slidereel init <NAME>        Create an empty project in a workspace

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use slidereel_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "slidereel",
    about = "Assemble narrated slides into Premiere/Final Cut sequences",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Sequence format overrides shared by commands that lay out a project.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FormatArgs {
    /// Timebase in frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Frame width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the sequence document for a workspace or project directory
    Build {
        /// Workspace (with config.json) or project directory
        path: PathBuf,

        /// Output file path (defaults to <project>/<name>.xml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sequence name (defaults to the project name)
        #[arg(long)]
        name: Option<String>,

        /// Fail when a slide image is missing on disk
        #[arg(long)]
        require_images: bool,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Validate slides and assets without writing anything
    Validate {
        /// Workspace (with config.json) or project directory
        path: PathBuf,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Show the per-track placement table
    Info {
        /// Workspace (with config.json) or project directory
        path: PathBuf,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Create a new empty project inside a workspace
    Init {
        /// Project name
        name: String,

        /// Workspace directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Do not append today's date to the project directory name
        #[arg(long)]
        no_date: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    slidereel_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Build {
            path,
            output,
            name,
            require_images,
            format,
        } => commands::build::run(&config, path, output, name, require_images, format),
        Commands::Validate { path, format } => commands::validate::run(&config, path, format),
        Commands::Info { path, format } => commands::info::run(&config, path, format),
        Commands::Init {
            name,
            output,
            no_date,
        } => commands::init::run(name, output, no_date),
    }
}
