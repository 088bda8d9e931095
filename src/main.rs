use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::{info, warn};
use std::path::{Path, PathBuf};

mod scene;

use driving_common::SceneConfig;
use driving_visualizer::animation::frame_interval;
use driving_visualizer::{load_font, Display, Figure, PngDisplay, VideoDisplay, Viewer};

/// Draws a driving simulation scene, one timestep or as an animation.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scene description file (.toml)
    #[arg(short, long, default_value = "scene.toml")]
    config: PathBuf,

    /// Timestep to draw as a still frame
    #[arg(short, long, default_value_t = 0, conflicts_with = "animate")]
    timestep: u32,

    /// Run the animation from --start-t up to the horizon
    #[arg(long)]
    animate: bool,

    /// Timestep the animation starts from
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    start_t: f64,

    /// Seconds between animation frames
    #[arg(long, default_value_t = 0.1)]
    real_t: f64,

    /// Output file: .png for stills and live views, .mp4 for recorded animations
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite the output PNG on every frame in real time instead of recording a video
    #[arg(long)]
    live: bool,

    /// Font used to label frames with their timestep
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    run_with_args(args)
}

fn run_with_args(args: Args) -> Result<()> {
    info!("Starting driving simulator viewer...");
    info!("Scene file: {}", args.config.display());

    let config = SceneConfig::load(&args.config)?;
    let state = scene::build_state(&config)?;
    let figure = Figure::from_config(&config.figure);

    let output = args.output.clone().unwrap_or_else(|| default_output(&args));
    let display = open_display(&args, &output, &figure)?;

    let mut viewer = Viewer::new(&state, figure, display);
    if let Some(font_path) = &args.font {
        match load_font(font_path) {
            Ok(font) => viewer = viewer.with_font(font),
            Err(e) => warn!("{:#}. Frames will not be labelled.", e),
        }
    }

    if args.animate {
        let summary = viewer.run_sim(args.start_t, args.real_t)?;
        info!("Drew {} frame(s) to {}", summary.frames_drawn, output.display());
    } else {
        if args.timestep >= state.horizon {
            warn!("Timestep {} is past the horizon ({}); vehicles hold their final pose.", args.timestep, state.horizon);
        }
        viewer.draw_timestep(args.timestep)?;
        viewer.into_display().close()?;
        info!("Timestep {} saved to {}", args.timestep, output.display());
    }

    Ok(())
}

fn default_output(args: &Args) -> PathBuf {
    if args.animate && !args.live {
        PathBuf::from("simulation.mp4")
    } else if args.live {
        PathBuf::from("live.png")
    } else {
        PathBuf::from(format!("timestep_{}.png", args.timestep))
    }
}

fn is_png(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// Stills and live views go to PNG; an animation to any other extension is recorded as MP4.
fn open_display(args: &Args, output: &Path, figure: &Figure) -> Result<Box<dyn Display>> {
    if args.live {
        if !is_png(output) {
            warn!("Live view writes PNG data to {}", output.display());
        }
        return Ok(Box::new(PngDisplay::live(output)));
    }
    if args.animate && !is_png(output) {
        let interval = frame_interval(args.real_t);
        let video = VideoDisplay::new(output, figure.width_px, figure.height_px, interval)
            .with_context(|| format!("Failed to open video output {}", output.display()))?;
        return Ok(Box::new(video));
    }
    Ok(Box::new(PngDisplay::still(output)))
}
