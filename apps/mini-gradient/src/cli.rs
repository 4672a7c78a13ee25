use std::path::PathBuf;

use anyhow::{anyhow, Result};
use app_settings::{AppSettings, ResampleFilter};
use clap::Parser;
use core_types::{Color, GradientJob, ResolutionSpec};

use crate::inputs::collect_images;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Overlay a vertical two-color gradient on the visible pixels of PNG images"
)]
pub struct Args {
    /// PNG files, or folders whose PNG files should all be processed
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Top gradient color as R,G,B or #RRGGBB
    #[arg(long)]
    pub top: Option<Color>,

    /// Bottom gradient color as R,G,B or #RRGGBB
    #[arg(long)]
    pub bottom: Option<Color>,

    /// Output folder (defaults to the last one used)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Original, 1920x1080, 1280x720, 800x600 or any WIDTHxHEIGHT
    #[arg(short, long, conflicts_with_all = ["width", "height"])]
    pub resolution: Option<ResolutionSpec>,

    /// Custom output width, used together with --height
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Custom output height, used together with --width
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Resampling filter: nearest, triangle, catmull-rom, gaussian, lanczos3
    #[arg(long)]
    pub filter: Option<ResampleFilter>,

    /// Remember colors, resolution, filter and output folder for next time
    #[arg(long)]
    pub save_defaults: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

/// A validated job plus the shell-only choices that go with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub job: GradientJob,
    pub filter: ResampleFilter,
}

/// Merge arguments over saved settings. Fails before any work starts when
/// something required is missing.
pub fn plan_run(args: &Args, settings: &AppSettings) -> Result<RunPlan> {
    let images = collect_images(&args.inputs)?;

    let output_dir = args
        .output
        .clone()
        .or_else(|| settings.get_last_output_dir())
        .ok_or_else(|| anyhow!("no output folder selected (pass --output)"))?;

    let resolution = match (args.width, args.height) {
        (Some(width), Some(height)) => ResolutionSpec::custom(width, height)?,
        _ => args.resolution.unwrap_or(settings.resolution),
    };

    let job = GradientJob::new(
        images,
        args.top.unwrap_or(settings.top),
        args.bottom.unwrap_or(settings.bottom),
        output_dir,
        resolution,
    );

    Ok(RunPlan {
        job,
        filter: args.filter.unwrap_or(settings.resample),
    })
}

pub fn remember(settings: &mut AppSettings, plan: &RunPlan) {
    settings.set_last_output_dir(plan.job.output_dir.clone());
    settings.set_colors(plan.job.top, plan.job.bottom);
    settings.resolution = plan.job.resolution;
    settings.resample = plan.filter;
}
