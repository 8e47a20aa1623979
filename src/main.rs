use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use tracing::info;

use em_wave::animation::AnimationDriver;
use em_wave::config::RunConfig;
use em_wave::fields::Polarization;
use em_wave::io::export_animation;
use em_wave::math::Scalar;
use em_wave::telemetry;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Animate an electromagnetic plane wave travelling through different media"
)]
struct Cli {
    /// TOML run configuration; flags below override its values
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Animation length in seconds [default: 8.0]
    #[arg(long)]
    duration: Option<f64>,

    /// Frames per second [default: 30]
    #[arg(long)]
    fps: Option<u32>,

    /// Sampled interval along the propagation axis [default: 0 4]
    #[arg(long, num_args = 2, value_names = ["START", "STOP"], allow_negative_numbers = true)]
    extent: Option<Vec<f64>>,

    /// Wavelength [default: 1.0]
    #[arg(long)]
    wavelength: Option<f64>,

    /// Electric field amplitude [default: 1.0]
    #[arg(long)]
    amplitude: Option<f64>,

    /// Propagation medium, see --list-media [default: vacuum]
    #[arg(long)]
    medium: Option<String>,

    /// linear-y, linear-z, circular-right or circular-left [default: linear-y]
    #[arg(long)]
    polarization: Option<Polarization>,

    /// Initial phase offset in radians [default: 0.0]
    #[arg(long, allow_negative_numbers = true)]
    phase: Option<f64>,

    /// Number of sample points [default: 200]
    #[arg(long)]
    points: Option<usize>,

    /// Export the animation; the extension picks the format (csv, vtk, gif, png, mp4)
    #[arg(long, value_hint = ValueHint::FilePath)]
    save: Option<PathBuf>,

    /// Overlay the wave in every known medium
    #[arg(long, action = ArgAction::SetTrue)]
    compare: bool,

    /// Do not open the interactive viewer
    #[arg(long, action = ArgAction::SetTrue)]
    no_show: bool,

    /// Plot width in pixels [default: 960]
    #[arg(long)]
    width: Option<u32>,

    /// Plot height in pixels [default: 540]
    #[arg(long)]
    height: Option<u32>,

    /// Video encoder executable used for mp4 [default: ffmpeg]
    #[arg(long)]
    encoder: Option<String>,

    /// Print the known media and exit
    #[arg(long, action = ArgAction::SetTrue)]
    list_media: bool,
}

impl Cli {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(duration) = self.duration {
            config.animation.duration = duration;
        }
        if let Some(fps) = self.fps {
            config.animation.fps = fps;
        }
        if let Some([start, stop]) = self.extent.as_deref() {
            config.grid.start = *start;
            config.grid.stop = *stop;
        }
        if let Some(wavelength) = self.wavelength {
            config.wave.wavelength = wavelength;
        }
        if let Some(amplitude) = self.amplitude {
            config.wave.amplitude = amplitude;
        }
        if let Some(medium) = &self.medium {
            config.wave.medium.clone_from(medium);
        }
        if let Some(polarization) = self.polarization {
            config.wave.polarization = polarization.name().to_owned();
        }
        if let Some(phase) = self.phase {
            config.wave.phase = phase;
        }
        if let Some(points) = self.points {
            config.grid.points = points;
        }
        if let Some(save) = &self.save {
            config.output.save = Some(save.clone());
        }
        if self.compare {
            config.animation.compare = true;
        }
        if let Some(width) = self.width {
            config.output.width = width;
        }
        if let Some(height) = self.height {
            config.output.height = height;
        }
        if let Some(encoder) = &self.encoder {
            config.output.encoder.clone_from(encoder);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing()?;

    let mut config = match &cli.config {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => RunConfig::default(),
    };
    cli.apply(&mut config);

    if cli.list_media {
        return list_media(&config);
    }

    config.validate().context("invalid run configuration")?;
    let driver = config.build_driver()?;

    if let Some(path) = &config.output.save {
        let report = export_animation(&driver, path, &config.export_options())
            .with_context(|| format!("failed to export animation to {}", path.display()))?;
        info!(files = report.outputs.len(), frames = report.frames, "export finished");
        println!("Animation saved to {}", path.display());
    }

    if !cli.no_show && show(&driver) {
        return Ok(());
    }
    if config.output.save.is_none() {
        print_summary(&driver);
    }
    Ok(())
}

fn list_media(config: &RunConfig) -> Result<()> {
    let catalog = config.catalog()?;
    for medium in catalog.iter() {
        println!(
            "{:<12} n = {:<8.4} v = {:.4} c   Z = {:.1} ohm",
            medium.name(),
            medium.refractive_index(),
            medium.phase_speed(),
            medium.intrinsic_impedance(),
        );
    }
    Ok(())
}

/// Opens the viewer; false when this build has none.
#[cfg(feature = "viewer")]
fn show(driver: &AnimationDriver) -> bool {
    em_wave::viewer::run(driver.clone());
    true
}

#[cfg(not(feature = "viewer"))]
fn show(_driver: &AnimationDriver) -> bool {
    tracing::warn!("built without the `viewer` feature; continuing headless (use --no-show to silence)");
    false
}

fn print_summary(driver: &AnimationDriver) {
    let mut peaks: Vec<(Scalar, Scalar)> = vec![(0.0, 0.0); driver.waves().len()];
    let summary = driver.for_each_frame(|frame| {
        for (peak, buffer) in peaks.iter_mut().zip(&frame.buffers) {
            peak.0 = peak.0.max(buffer.peak_electric());
            peak.1 = peak.1.max(buffer.peak_magnetic());
        }
        ControlFlow::Continue(())
    });
    println!(
        "{} frames at {} fps over {} points",
        summary.frames_delivered,
        driver.timeline().fps(),
        driver.grid().len()
    );
    for (wave, (e, b)) in driver.waves().iter().zip(peaks) {
        println!(
            "{:<12} v = {:.4} c   peak |E| = {:.4}   peak |B| = {:.4}",
            wave.medium().name(),
            wave.phase_speed(),
            e,
            b
        );
    }
}
