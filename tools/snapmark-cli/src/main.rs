//! Snapmark CLI: create annotation sessions and export findings.
//!
//! Usage:
//!   snapmark init <NAME>                 Create a new session
//!   snapmark add-slide <PATH> <IMAGE>    Add a captured image or video frame
//!   snapmark annotate <PATH> ...         Draw an annotation on a slide
//!   snapmark render <PATH>               Render composite images
//!   snapmark summary <PATH>              Print a text summary
//!   snapmark info <PATH>                 Show session information
//!   snapmark validate <PATH>             Validate a session directory

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use snapmark_common::config::{AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "snapmark",
    about = "Annotate screenshots and video frames, then export the findings",
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

#[derive(Subcommand)]
enum Commands {
    /// Create a new empty session
    Init {
        /// Session name
        name: String,

        /// Parent directory (defaults to the configured sessions directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add an image (or a decoded video frame) as a new slide
    AddSlide {
        /// Path to the session directory
        path: PathBuf,

        /// Image file to import
        image: PathBuf,

        /// Slide name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,

        /// Treat the image as a frame of a video this many seconds long
        #[arg(long)]
        video_duration: Option<f64>,

        /// Playback position of the frame, in seconds
        #[arg(long, default_value = "0.0", requires = "video_duration")]
        video_time: f64,
    },

    /// Draw one annotation by replaying a pointer gesture
    Annotate {
        /// Path to the session directory
        path: PathBuf,

        /// Slide id (defaults to the active slide)
        #[arg(long)]
        slide: Option<String>,

        /// Gesture start in display coordinates, as `x,y`
        #[arg(long)]
        from: String,

        /// Gesture end in display coordinates, as `x,y`
        #[arg(long)]
        to: String,

        /// Shape: rect | ellipse (defaults to the last one used)
        #[arg(long)]
        shape: Option<String>,

        /// Hex color such as `#3b82f6` (defaults to the last one used)
        #[arg(long)]
        color: Option<String>,

        /// Comment for the new annotation
        #[arg(long)]
        comment: Option<String>,

        /// Width the slide is displayed at, which sets the coordinate space
        #[arg(long)]
        display_width: Option<f64>,
    },

    /// Render composite images for one or all slides
    Render {
        /// Path to the session directory
        path: PathBuf,

        /// Render only this slide
        #[arg(long)]
        slide: Option<String>,

        /// Output format: png | jpeg
        #[arg(long, default_value = "png")]
        format: String,

        /// JPEG quality 1-100 (defaults to the configured quality)
        #[arg(long)]
        quality: Option<u8>,

        /// Output directory (defaults to <session>/exports)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Width the slides were annotated at; skips the estimate
        #[arg(long)]
        display_width: Option<f64>,
    },

    /// Print a plain-text or markdown summary of all findings
    Summary {
        /// Path to the session directory
        path: PathBuf,

        /// Emit markdown instead of plain text
        #[arg(long)]
        markdown: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show session information
    Info {
        /// Path to the session directory
        path: PathBuf,
    },

    /// Validate a session directory
    Validate {
        /// Path to the session directory
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let logging = if cli.verbose {
        LoggingConfig {
            level: "debug".to_string(),
            ..config.logging.clone()
        }
    } else {
        config.logging.clone()
    };
    snapmark_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init { name, output } => {
            commands::init::run(name, output.unwrap_or_else(|| config.sessions_dir.clone()))
        }
        Commands::AddSlide {
            path,
            image,
            name,
            video_duration,
            video_time,
        } => commands::add_slide::run(path, image, name, video_duration, video_time),
        Commands::Annotate {
            path,
            slide,
            from,
            to,
            shape,
            color,
            comment,
            display_width,
        } => commands::annotate::run(
            &config,
            commands::annotate::AnnotateArgs {
                path,
                slide,
                from,
                to,
                shape,
                color,
                comment,
                display_width,
            },
        ),
        Commands::Render {
            path,
            slide,
            format,
            quality,
            output,
            display_width,
        } => {
            commands::render::run(&config, path, slide, format, quality, output, display_width)
                .await
        }
        Commands::Summary {
            path,
            markdown,
            output,
        } => commands::summary::run(path, markdown, output),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
    }
}
