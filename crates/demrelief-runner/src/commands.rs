//! Subcommand dispatch onto the library operations.

use crate::cli::{Command, FetchArgs, PlotArgs};
use crate::config::Config;
use crate::error::{Result, RunnerError};
use demrelief_dem::{
    convert_to_image, describe, simplify, BoundingBox, DemFetcher, DemRequest, DemSummary,
};
use demrelief_plot::{plot, PlotOptions};
use demrelief_scene::{write_render_script, BlenderRunner, RenderJob};
use std::io::Write;
use tracing::info;

/// Run `command` with the merged `config`, writing user-facing output to `out`.
pub fn run<W: Write>(command: &Command, config: &Config, out: &mut W) -> Result<()> {
    match command {
        Command::Fetch(args) => fetch(args, config, out),
        Command::Describe { input, json } => {
            let summary = describe(input)?;
            if *json {
                serde_json::to_writer_pretty(&mut *out, &summary)?;
                writeln!(out)?;
            } else {
                write_summary(&summary, out)?;
            }
            Ok(())
        }
        Command::Simplify {
            input,
            output,
            factor,
        } => {
            let (width, height) = simplify(input, output, *factor)?;
            writeln!(out, "{}: {width} x {height}", output.display())?;
            Ok(())
        }
        Command::Convert { input, output } => {
            convert_to_image(input, output)?;
            writeln!(out, "{}", output.display())?;
            Ok(())
        }
        Command::Plot(args) => plot_figure(args, out),
        Command::Render { dem, output, .. } => {
            let job = RenderJob::prepare(dem, output, config.render)?;
            let rendered = BlenderRunner::new(&config.blender.executable).render(&job)?;
            writeln!(out, "{}", rendered.display())?;
            Ok(())
        }
        Command::Script {
            dem,
            output,
            script,
            ..
        } => {
            let job = RenderJob::prepare(dem, output, config.render)?;
            write_render_script(&job, script)?;
            writeln!(out, "{}", script.display())?;
            Ok(())
        }
    }
}

fn fetch<W: Write>(args: &FetchArgs, config: &Config, out: &mut W) -> Result<()> {
    let bbox = BoundingBox::new(args.north, args.south, args.east, args.west)?;
    let api_key = config
        .api
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or(RunnerError::MissingApiKey)?;

    let request = DemRequest::new(bbox, config.api.dataset, api_key);
    let fetcher = DemFetcher::with_base_url(&config.api.base_url, config.api.timeout())?;
    info!(dataset = %config.api.dataset, "fetching DEM");
    let written = fetcher.fetch(&request, &args.output)?;
    writeln!(out, "{}", written.display())?;
    Ok(())
}

fn plot_figure<W: Write>(args: &PlotArgs, out: &mut W) -> Result<()> {
    let options = PlotOptions {
        show_histogram: !args.no_histogram,
        colormap: args.colormap.clone(),
        title: args.title.clone(),
    };
    let figure = plot(&args.input, &options)?;
    figure.save(&args.output)?;
    writeln!(out, "{}", args.output.display())?;
    Ok(())
}

fn write_summary<W: Write>(summary: &DemSummary, out: &mut W) -> Result<()> {
    for (key, value) in summary.to_map() {
        writeln!(out, "{key}: {value}")?;
    }
    writeln!(
        out,
        "size: {} x {} ({} band{})",
        summary.width,
        summary.height,
        summary.bands,
        if summary.bands == 1 { "" } else { "s" }
    )?;
    if let Some(b) = summary.bounds {
        writeln!(
            out,
            "bounds: lat {} to {}, lon {} to {}",
            b.min_lat, b.max_lat, b.min_lon, b.max_lon
        )?;
    }
    if let Some(epsg) = summary.epsg {
        writeln!(out, "crs: EPSG:{epsg}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_summary() {
        let summary = DemSummary {
            min: 12.0,
            max: 4392.5,
            width: 200,
            height: 100,
            bands: 1,
            bounds: None,
            epsg: Some(4326),
        };
        let mut out = Vec::new();
        write_summary(&summary, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "max pixel value: 4392.5\nmin pixel value: 12\nsize: 200 x 100 (1 band)\ncrs: EPSG:4326\n"
        );
    }
}
