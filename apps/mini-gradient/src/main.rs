mod cli;
mod inputs;
mod logging;

use std::sync::mpsc;
use std::sync::Arc;

use anyhow::{Context, Result};
use app_settings::{AppSettings, ResampleFilter};
use clap::Parser;
use core_types::ProgressEvent;
use engine::{spawn_batch, BatchCallbacks, BatchReport, BatchRunner, ImageEngine};
use image::imageops::FilterType;
use tracing::{info, warn};

use crate::cli::Args;
use crate::logging::init_logging;

enum BatchMessage {
    Progress(ProgressEvent),
    Completed(BatchReport),
}

fn filter_type(filter: ResampleFilter) -> FilterType {
    match filter {
        ResampleFilter::Nearest => FilterType::Nearest,
        ResampleFilter::Triangle => FilterType::Triangle,
        ResampleFilter::CatmullRom => FilterType::CatmullRom,
        ResampleFilter::Gaussian => FilterType::Gaussian,
        ResampleFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut settings = AppSettings::load().unwrap_or_else(|err| {
        warn!("Failed to load settings, using defaults: {err}");
        AppSettings::default()
    });

    let plan = cli::plan_run(&args, &settings)?;
    info!(
        "{} image(s) -> {}",
        plan.job.len(),
        plan.job.output_dir.display()
    );

    let (tx, rx) = mpsc::channel();
    let progress_tx = tx.clone();
    let callbacks = BatchCallbacks {
        progress: Some(Arc::new(move |event: ProgressEvent| {
            progress_tx.send(BatchMessage::Progress(event)).ok();
        })),
        on_complete: Some(Arc::new(move |report: &BatchReport| {
            tx.send(BatchMessage::Completed(report.clone())).ok();
        })),
        ..BatchCallbacks::default()
    };

    let runner = BatchRunner::new(ImageEngine::with_filter(filter_type(plan.filter)));
    let handle = spawn_batch(runner, plan.job.clone(), callbacks);

    // The channel closes once the worker drops its callbacks.
    for message in rx {
        match message {
            BatchMessage::Progress(event) => {
                println!("{:>3}% ({}/{})", event.percent, event.completed, event.total);
            }
            BatchMessage::Completed(report) => {
                if report.is_success() {
                    println!("Operation complete: {} image(s) written", report.written.len());
                } else if report.canceled {
                    println!("Canceled after {} image(s)", report.written.len());
                }
            }
        }
    }

    let report = handle.join().context("gradient batch failed")?;

    if args.save_defaults && report.is_success() {
        cli::remember(&mut settings, &plan);
        if let Err(err) = settings.save() {
            warn!("Failed to save settings: {err}");
        }
    }

    Ok(())
}
