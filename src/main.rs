use anyhow::Context;
use clap::Parser;
use motion_recorder::capture::list_cameras;
use motion_recorder::config::DetectorConfig;
use motion_recorder::detector::StopReason;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "motion-recorder")]
#[command(about = "Motion detection camera with automatic recording")]
#[command(version)]
struct Cli {
    /// Camera index, or a video file/URL [default: 0]
    #[arg(short = 'c', long = "camera", value_name = "SOURCE")]
    source: Option<String>,

    /// Motion sensitivity threshold, lower is more sensitive [default: 200000]
    #[arg(short, long)]
    threshold: Option<u64>,

    /// Frames to keep recording after motion stops [default: 15]
    #[arg(short = 'b', long = "buffer", value_name = "FRAMES")]
    hold_over: Option<u32>,

    /// Output directory for recordings [default: output_files]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run without the preview (headless mode)
    #[arg(long = "no-preview", alias = "headless")]
    no_preview: bool,

    /// JSON file with detector settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// List available cameras and exit
    #[arg(long)]
    list_cameras: bool,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => DetectorConfig::default(),
        };

        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(hold_over) = self.hold_over {
            config.hold_over_frames = hold_over;
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if self.no_preview {
            config.preview = false;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn init_tracing(default_filter: &str) {
    // RUST_LOG overrides the default, e.g. RUST_LOG=motion_recorder=debug
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_cameras {
        init_tracing("motion_recorder=info");
        return match list_cameras() {
            Ok(cameras) if cameras.is_empty() => {
                println!("No cameras found");
                ExitCode::SUCCESS
            }
            Ok(cameras) => {
                for camera in cameras {
                    println!("{}: {}", camera.id, camera.name);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::from(1)
            }
        };
    }

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(1);
        }
    };

    // Logs share the terminal with the preview, so keep them quiet there
    init_tracing(if config.preview {
        "motion_recorder=warn"
    } else {
        "motion_recorder=info"
    });

    let interrupt = Arc::new(AtomicBool::new(false));
    let interrupt_flag = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        interrupt_flag.store(true, Ordering::SeqCst);
    }) {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }

    println!("Motion detection started (threshold={})", config.threshold);
    if config.preview {
        println!("Press 'q' to quit");
    } else {
        println!("Press Ctrl+C to stop");
    }

    match motion_recorder::run(&config, interrupt) {
        Ok(summary) => {
            if summary.stop_reason == StopReason::Interrupted {
                println!();
                println!("Interrupted by user");
            }
            for session in &summary.sessions {
                println!(
                    "Saved {} ({} frames)",
                    session.path.display(),
                    session.frame_count
                );
            }
            println!("Motion detection stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(code = e.code(), "{}", e);
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
