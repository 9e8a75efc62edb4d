//! Command-line front end: calibrate on a still, score darts in a frame,
//! or run the pure coordinate scorer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use dartsight::imageio;
use dartsight::pipeline::VisionPipeline;
use dartsight::{calculate_score, FrameResult};

#[derive(Parser)]
#[command(name = "dartsight", about = "Dartboard calibration and throw scoring", version)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect the board in an image and print the calibration.
    Calibrate {
        image: PathBuf,
        /// Emit the full diagnostic as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Calibrate on a dart-free reference image, then detect and score
    /// darts in a frame.
    Detect {
        /// Dart-free baseline image of the board.
        #[arg(long)]
        reference: PathBuf,
        /// Frame to search for darts.
        frame: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Score a board-space coordinate (mm from center).
    Score {
        #[arg(allow_negative_numbers = true)]
        x_mm: f32,
        #[arg(allow_negative_numbers = true)]
        y_mm: f32,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    dartsight::core::init_with_level(level)?;

    match cli.command {
        Command::Calibrate { image, json } => calibrate(&image, json),
        Command::Detect {
            reference,
            frame,
            json,
        } => detect(&reference, &frame, json),
        Command::Score { x_mm, y_mm, json } => {
            let score = calculate_score(x_mm, y_mm);
            if json {
                println!("{}", serde_json::to_string_pretty(&score)?);
            } else {
                println!("{} ({} points)", score.label, score.value);
            }
            Ok(())
        }
    }
}

fn calibrate(path: &PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let img = imageio::load_gray(path)?;
    let mut pipeline = VisionPipeline::default();
    let (calibration, debug) = pipeline.calibrate(&imageio::gray_frame(&img)?);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "calibration": calibration,
                "debug": debug,
            }))?
        );
    } else {
        println!("{}", debug.reason());
        if let Some(c) = calibration {
            println!(
                "center: ({:.1}, {:.1}) px  outer radius: {:.1} px  scale: {:.3} px/mm",
                c.center.x, c.center.y, c.outer_radius, c.pixels_per_mm
            );
        }
    }
    Ok(())
}

fn detect(
    reference: &PathBuf,
    frame: &PathBuf,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let reference_img = imageio::load_gray(reference)?;
    let frame_img = imageio::load_gray(frame)?;

    let mut pipeline = VisionPipeline::default();
    let (calibration, debug) = pipeline.calibrate(&imageio::gray_frame(&reference_img)?);
    if calibration.is_none() {
        println!("{}", debug.reason());
        return Ok(());
    }
    // the operator vouches this image is dart-free, so make it the baseline
    // even if calibration confidence alone would not have
    pipeline.update_reference(&imageio::gray_frame(&reference_img)?);

    let result = pipeline.process_frame(&imageio::gray_frame(&frame_img)?);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &FrameResult) {
    if result.darts.is_empty() {
        println!("no darts detected");
    }
    for (dart, score) in result.darts.iter().zip(&result.scores) {
        println!(
            "{} ({} points)  tip ({:.1}, {:.1}) mm  confidence {:.2}",
            score.label, score.value, dart.tip_mm.x, dart.tip_mm.y, dart.confidence
        );
    }
    if result.needs_fallback {
        println!("low confidence: consider manual entry");
    }
}
