use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use tryon_core::overlay::domain::overlay_catalog::OverlayCatalog;
use tryon_core::overlay::domain::placement_transform::PlacementTransform;
use tryon_core::overlay::infrastructure::css_overlay_renderer::CssOverlayRenderer;
use tryon_core::overlay::infrastructure::raster_overlay_renderer::RasterOverlayRenderer;
use tryon_core::overlay::overlay_presenter::OverlayPresenter;
use tryon_core::session::domain::session_state::TrackingStatus;
use tryon_core::session::infrastructure::image_sequence_camera::ImageSequenceCamera;
use tryon_core::session::session_logger::StdoutSessionLogger;
use tryon_core::session::try_on_session::TryOnSession;
use tryon_core::shared::config::TryOnConfig;
use tryon_core::shared::viewport::Viewport;
use tryon_core::tracking::domain::landmark_index_map::LandmarkIndexMap;
use tryon_core::tracking::domain::landmark_record::LandmarkRecord;
use tryon_core::tracking::infrastructure::replay_detector::{LandmarkTrace, ReplayDetector};
use tryon_core::tracking::landmark_tracker::{LandmarkTracker, LossPolicy};

/// Virtual eyewear try-on: landmark traces in, overlay placements out.
#[derive(Parser)]
#[command(name = "tryon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available eyewear styles.
    Styles,

    /// Run a landmark trace through tracking and placement, one JSON line per frame.
    Replay {
        /// Landmark trace (JSON).
        trace: PathBuf,

        #[command(flatten)]
        tracking: TrackingArgs,

        /// Viewport width in pixels.
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Viewport height in pixels.
        #[arg(long, default_value = "720")]
        height: u32,

        /// Switch style at a frame, as FRAME:STYLE (repeatable).
        #[arg(long = "switch-style-at")]
        switches: Vec<StyleSwitch>,
    },

    /// Composite a sprite onto a recorded image sequence using a landmark trace.
    Composite {
        /// Landmark trace (JSON), one entry per image.
        trace: PathBuf,

        #[command(flatten)]
        tracking: TrackingArgs,

        /// Directory of frames, played back in name order.
        #[arg(long)]
        frames: PathBuf,

        /// RGBA artwork for the selected style.
        #[arg(long)]
        sprite: PathBuf,

        /// Directory for the composited frames.
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct TrackingArgs {
    /// Settings file (defaults to the per-user settings).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Style id (see `tryon styles`).
    #[arg(long)]
    style: Option<String>,

    /// What to do with smoothing state when the face is lost: retain or reset.
    #[arg(long)]
    loss_policy: Option<LossPolicy>,

    /// Smoothing factor for positions, width and scale (0.0-1.0].
    #[arg(long)]
    position_smoothing: Option<f64>,

    /// Smoothing factor for the head roll angle (0.0-1.0].
    #[arg(long)]
    angle_smoothing: Option<f64>,

    /// Smallest accepted temple-to-temple width, normalized.
    #[arg(long)]
    min_face_width: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
struct StyleSwitch {
    frame: usize,
    style: String,
}

impl FromStr for StyleSwitch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (frame, style) = s
            .split_once(':')
            .ok_or_else(|| format!("expected FRAME:STYLE, got '{s}'"))?;
        let frame = frame
            .trim()
            .parse()
            .map_err(|_| format!("invalid frame number '{frame}'"))?;
        let style = style.trim();
        if style.is_empty() {
            return Err(format!("missing style in '{s}'"));
        }
        Ok(Self {
            frame,
            style: style.to_string(),
        })
    }
}

/// One line of `replay` output.
#[derive(Serialize)]
struct ReplayLine<'a> {
    frame: usize,
    face_detected: bool,
    style: &'a str,
    landmarks: Option<LandmarkRecord>,
    placement: Option<PlacementTransform>,
    css: Option<&'a str>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Styles => run_styles(),
        Command::Replay {
            trace,
            tracking,
            width,
            height,
            switches,
        } => {
            let config = build_config(&tracking)?;
            run_replay(&trace, &config, Viewport::new(width, height), &switches)
        }
        Command::Composite {
            trace,
            tracking,
            frames,
            sprite,
            output,
        } => {
            let config = build_config(&tracking)?;
            run_composite(&trace, config, &frames, &sprite, &output)
        }
    }
}

fn run_styles() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = OverlayCatalog::builtin();
    for asset in catalog.assets() {
        println!(
            "{:<10} {:<12} base {:>5.0}px  {}",
            asset.id, asset.name, asset.base_width, asset.description
        );
    }
    Ok(())
}

fn run_replay(
    trace_path: &Path,
    config: &TryOnConfig,
    viewport: Viewport,
    switches: &[StyleSwitch],
) -> Result<(), Box<dyn std::error::Error>> {
    if viewport.is_empty() {
        return Err("Viewport width and height must be positive".into());
    }
    let trace = LandmarkTrace::load(trace_path)?;
    let index_map = LandmarkIndexMap::by_name(&trace.backend).ok_or_else(|| {
        format!(
            "Unknown landmark backend '{}' (expected one of: {})",
            trace.backend,
            LandmarkIndexMap::names().collect::<Vec<_>>().join(", ")
        )
    })?;

    let mut tracker = LandmarkTracker::new(index_map, config.tracker_config());
    let mut presenter = presenter_for(config)?;
    for switch in switches {
        if presenter.catalog().get(&switch.style).is_none() {
            return Err(format!("Unknown style '{}' at frame {}", switch.style, switch.frame).into());
        }
    }
    let mut renderer = CssOverlayRenderer::new();

    for index in 0..trace.len() {
        for switch in switches.iter().filter(|s| s.frame == index) {
            presenter.select(&switch.style)?;
        }

        let update = tracker.process(&trace.detection(index));
        let draw = presenter.present_to(update.landmarks.as_ref(), viewport, &mut renderer);
        let line = ReplayLine {
            frame: index,
            face_detected: update.face_detected,
            style: &presenter.selected().id,
            landmarks: update.landmarks,
            placement: draw.map(|d| d.placement),
            css: renderer.current().map(|c| c.style.as_str()),
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    let stats = tracker.stats();
    log::info!(
        "Replayed {} frames: {} tracked, {} rejected",
        stats.frames,
        stats.faces,
        stats.rejected
    );
    Ok(())
}

fn run_composite(
    trace_path: &Path,
    config: TryOnConfig,
    frames_dir: &Path,
    sprite: &Path,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let trace = LandmarkTrace::load(trace_path)?;
    let presenter = presenter_for(&config)?;
    let mut renderer = RasterOverlayRenderer::new();
    renderer.load_sprite(&presenter.selected().id, sprite)?;
    fs::create_dir_all(output)
        .map_err(|e| format!("Failed to create {}: {e}", output.display()))?;

    let camera = ImageSequenceCamera::new(frames_dir);
    let mut session = TryOnSession::new(Box::new(camera), config)
        .with_logger(Box::new(StdoutSessionLogger::default()))
        .with_frame_buffer(None);
    session.request_permission()?;
    session.start(Some(Box::new(ReplayDetector::new(trace))))?;
    if let TrackingStatus::Unavailable(reason) = &session.state().tracking {
        log::warn!("Writing frames without overlay: {reason}");
    }

    let frames = session.frames().ok_or("Session has no frame stream")?;
    let updates = session.updates().ok_or("Session has no update stream")?;
    let mut written = 0usize;

    for mut frame in frames.iter() {
        // The loop sends a frame's update before the frame itself.
        let record = updates
            .try_iter()
            .find(|u| u.frame_index == frame.index())
            .and_then(|u| u.update.landmarks);

        let index = frame.index();
        let viewport = frame.viewport();
        frame.mirror_horizontal();
        renderer.set_canvas(frame);
        presenter.present_to(record.as_ref(), viewport, &mut renderer);

        let image = renderer
            .take_canvas()
            .and_then(|canvas| canvas.into_rgb_image())
            .ok_or("Failed to rebuild composited frame")?;
        let path = output.join(format!("frame_{index:05}.png"));
        image
            .save(&path)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        written += 1;
    }

    session.stop();
    log::info!("Wrote {written} frames to {}", output.display());
    Ok(())
}

fn build_config(args: &TrackingArgs) -> Result<TryOnConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => TryOnConfig::load_from(path)?,
        None => TryOnConfig::load(),
    };
    if let Some(style) = &args.style {
        config.default_asset = style.clone();
    }
    if let Some(policy) = args.loss_policy {
        config.loss_policy = policy;
    }
    if let Some(factor) = args.position_smoothing {
        config.position_smoothing = factor;
    }
    if let Some(factor) = args.angle_smoothing {
        config.angle_smoothing = factor;
    }
    if let Some(width) = args.min_face_width {
        config.min_face_width = width;
    }
    config.validate()?;
    Ok(config)
}

fn presenter_for(config: &TryOnConfig) -> Result<OverlayPresenter, Box<dyn std::error::Error>> {
    let mut presenter = OverlayPresenter::default();
    presenter.select(&config.default_asset)?;
    Ok(presenter)
}
