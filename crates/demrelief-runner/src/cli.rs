//! Command-line argument parsing.

use crate::config::Config;
use clap::{Args, Parser, Subcommand};
use demrelief_dem::Dataset;
use std::path::PathBuf;

/// Download DEMs, transform and plot them, and render shaded relief with Blender.
///
/// CLI values override settings loaded from `--config`.
#[derive(Parser, Debug)]
#[command(name = "demrelief", version, about)]
pub struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download a GeoTIFF DEM for a bounding box.
    Fetch(FetchArgs),
    /// Print min/max and georeferencing of a GeoTIFF DEM.
    Describe {
        /// GeoTIFF to summarise.
        input: PathBuf,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Downsample a DEM or image by an integer factor.
    Simplify {
        input: PathBuf,
        output: PathBuf,
        /// Divide both dimensions by this factor (at least 2).
        #[arg(long, default_value_t = 2)]
        factor: u32,
    },
    /// Rescale a GeoTIFF DEM to an 8-bit PNG, BMP or GeoTIFF.
    Convert { input: PathBuf, output: PathBuf },
    /// Plot a GeoTIFF DEM with a colour bar and histogram to a PNG.
    Plot(PlotArgs),
    /// Render shaded relief with a headless Blender.
    Render {
        /// DEM image used as displacement texture (.png, .bmp, .tif, .tiff).
        dem: PathBuf,
        /// Rendered image (.png).
        output: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
        /// Blender executable.
        #[arg(long)]
        blender: Option<PathBuf>,
    },
    /// Write the render program for running inside an open Blender session.
    Script {
        /// DEM image used as displacement texture (.png, .bmp, .tif, .tiff).
        dem: PathBuf,
        /// Image the script renders to (.png).
        output: PathBuf,
        /// Python file to write.
        #[arg(long, default_value = "render_dem.py")]
        script: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Northern latitude.
    #[arg(long, allow_negative_numbers = true)]
    pub north: f64,
    /// Southern latitude.
    #[arg(long, allow_negative_numbers = true)]
    pub south: f64,
    /// Eastern longitude.
    #[arg(long, allow_negative_numbers = true)]
    pub east: f64,
    /// Western longitude.
    #[arg(long, allow_negative_numbers = true)]
    pub west: f64,
    /// GeoTIFF to write (.tif, .tiff).
    pub output: PathBuf,
    /// Dataset name, e.g. SRTMGL1 or COP30.
    #[arg(long)]
    pub dataset: Option<Dataset>,
    /// OpenTopography API key.
    #[arg(long)]
    pub api_key: Option<String>,
    /// Alternative API endpoint.
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct PlotArgs {
    /// GeoTIFF to plot.
    pub input: PathBuf,
    /// Figure to write (.png).
    pub output: PathBuf,
    /// Colormap name (Greys, gray, viridis, magma, terrain; `_r` reverses).
    #[arg(long, default_value = "Greys_r")]
    pub colormap: String,
    #[arg(long, default_value = "DEM Map")]
    pub title: String,
    /// Leave out the histogram panel.
    #[arg(long)]
    pub no_histogram: bool,
}

/// Render parameter overrides.
#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Vertical exaggeration.
    #[arg(long)]
    pub exaggeration: Option<f32>,
    /// Sun angular diameter in degrees (0-180).
    #[arg(long)]
    pub shadow_softness: Option<f32>,
    /// Sun elevation in degrees (0-90).
    #[arg(long)]
    pub sun_angle: Option<f32>,
    /// Bearing the sunlight comes from, degrees clockwise from north.
    #[arg(long)]
    pub sun_azimuth: Option<f32>,
    /// Output size as a percentage of the DEM size (1-100).
    #[arg(long)]
    pub resolution_scale: Option<u32>,
    /// Samples per pixel.
    #[arg(long)]
    pub samples: Option<u32>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(ref level) = cli.log_level {
            self.log.level = level.clone();
        }
        match &cli.command {
            Command::Fetch(args) => {
                if let Some(dataset) = args.dataset {
                    self.api.dataset = dataset;
                }
                if let Some(ref key) = args.api_key {
                    self.api.api_key = Some(key.clone());
                }
                if let Some(ref url) = args.base_url {
                    self.api.base_url = url.clone();
                }
            }
            Command::Render {
                render, blender, ..
            } => {
                self.apply_render_overrides(render);
                if let Some(exe) = blender {
                    self.blender.executable = exe.clone();
                }
            }
            Command::Script { render, .. } => self.apply_render_overrides(render),
            _ => {}
        }
    }

    fn apply_render_overrides(&mut self, args: &RenderArgs) {
        if let Some(v) = args.exaggeration {
            self.render.exaggeration = v;
        }
        if let Some(v) = args.shadow_softness {
            self.render.shadow_softness = v;
        }
        if let Some(v) = args.sun_angle {
            self.render.sun_angle = v;
        }
        if let Some(v) = args.sun_azimuth {
            self.render.sun_azimuth = v;
        }
        if let Some(v) = args.resolution_scale {
            self.render.resolution_scale = v;
        }
        if let Some(v) = args.samples {
            self.render.samples = v;
        }
    }
}
