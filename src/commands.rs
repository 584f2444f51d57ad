//! Subcommand implementations
//!
//! Each command writes program text to `out` and anything meant for the
//! operator (bounds, height map reports) to `report`, so `out` can be piped
//! straight into a sender.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use cnctools_autolevel::{
    apply_height_map_to_writer, generate_probe_program, probe_grid, scan_boundaries_file,
    HeightMap, ProbeGrid, ProbeProgramParameters, SimulatedProbe, SurfaceModel,
};
use cnctools_camtools::{
    calibrate_steps_per_mm, triangle_pattern, CuttingMode, FocusRampGenerator,
    FocusRampParameters, SpiralFillGenerator, SpiralFillParameters, SpoilboardSurfacingGenerator,
    SpoilboardSurfacingParameters,
};
use cnctools_core::CorrectionMode;
use cnctools_settings::Config;

use crate::cli::{AutolevelArgs, Command, ExportFormat, LaserCommand, ProbeArgs, SpoilboardArgs};

/// Run one subcommand
pub fn execute(
    command: &Command,
    config: &Config,
    out: &mut dyn Write,
    report: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Bounds { file } => {
            let bounds = scan_boundaries_file(file)
                .with_context(|| format!("Failed to scan {}", file.display()))?;
            writeln!(out, "Bounds:\n{}", bounds)?;
        }
        Command::Autolevel(args) => autolevel(args, config, out, report)?,
        Command::Probe(args) => probe(args, config, out)?,
        Command::Spoilboard(args) => spoilboard(args, config, out)?,
        Command::Laser { pattern } => laser(pattern, config, out)?,
        Command::Steps {
            current,
            target,
            actual,
        } => {
            let steps = calibrate_steps_per_mm(*current, *target, *actual)?;
            writeln!(out, "New steps per mm: {:.3}", steps)?;
        }
    }
    Ok(())
}

fn autolevel(
    args: &AutolevelArgs,
    config: &Config,
    out: &mut dyn Write,
    report: &mut dyn Write,
) -> Result<()> {
    let bounds = scan_boundaries_file(&args.file)
        .with_context(|| format!("Failed to scan {}", args.file.display()))?;
    writeln!(report, "Bounds:\n{}", bounds)?;

    let map = match &args.heightmap {
        Some(path) => load_height_map(path)?,
        None => {
            let rows = args.rows.unwrap_or(config.probing.rows);
            let cols = args.cols.unwrap_or(config.probing.cols);
            let grid = ProbeGrid::from_bounds(&bounds, rows, cols)
                .context("Cannot lay out a probe grid over this program")?;
            let mut probe = SimulatedProbe::new(SurfaceModel {
                offset: args.offset,
                tilt_x: args.tilt_x,
                tilt_y: args.tilt_y,
                ..SurfaceModel::default()
            });
            probe_grid(&mut probe, &grid)?
        }
    };

    let exported = export_height_map(&map, args.export)?;
    match &args.export_to {
        Some(path) => std::fs::write(path, exported)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => report.write_all(exported.as_bytes())?,
    }

    let mode = args
        .mode
        .map(CorrectionMode::from)
        .unwrap_or(config.leveling.mode);

    let program = File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let reader = BufReader::new(program);

    let stats = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            apply_height_map_to_writer(reader, &map, mode, BufWriter::new(file))?
        }
        None => apply_height_map_to_writer(reader, &map, mode, &mut *out)?,
    };

    tracing::info!(
        leveled = stats.lines_leveled,
        copied = stats.lines_passed_through,
        "Leveled {}",
        args.file.display()
    );
    Ok(())
}

fn load_height_map(path: &Path) -> Result<HeightMap> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read height map {}", path.display()))?;
    let map = HeightMap::from_json(&json)
        .with_context(|| format!("Invalid height map {}", path.display()))?;
    if map.len() < 3 {
        tracing::warn!(points = map.len(), "Height map has fewer than three samples");
    }
    Ok(map)
}

/// Render a height map in the requested format
pub fn export_height_map(map: &HeightMap, format: ExportFormat) -> Result<String> {
    Ok(match format {
        ExportFormat::Json => {
            let mut json = map.to_json_pretty()?;
            json.push('\n');
            json
        }
        ExportFormat::Csv => map.to_csv(),
        ExportFormat::Pretty => map.to_pretty(),
    })
}

fn probe(args: &ProbeArgs, config: &Config, out: &mut dyn Write) -> Result<()> {
    let (rows, cols) = match args.grid.as_slice() {
        [] => (config.probing.rows, config.probing.cols),
        [n] => (*n, *n),
        [rows, cols, ..] => (*rows, *cols),
    };

    let grid = ProbeGrid::new(
        args.x_start,
        args.x_end,
        args.y_start,
        args.y_end,
        rows,
        cols,
    )?;
    let params = ProbeProgramParameters {
        grid,
        probe_depth: args.depth.unwrap_or(config.probing.probe_depth),
        safe_height: args.safe_height.unwrap_or(config.probing.safe_height),
        probe_feed: args.feed.unwrap_or(config.probing.probe_feed),
    };
    if params.safe_height <= params.probe_depth {
        bail!(
            "Safe height {} must be above probe depth {}",
            params.safe_height,
            params.probe_depth
        );
    }

    out.write_all(generate_probe_program(&params).as_bytes())?;
    Ok(())
}

fn spoilboard(args: &SpoilboardArgs, config: &Config, out: &mut dyn Write) -> Result<()> {
    let s = &config.spoilboard;
    let params = SpoilboardSurfacingParameters {
        x_max: args.x_max.unwrap_or(s.x_max),
        y_max: args.y_max.unwrap_or(s.y_max),
        cut_depth: args.depth.unwrap_or(s.cut_depth),
        stepover: args.step_over.unwrap_or(s.stepover),
        feed_rate: args.feed_rate.unwrap_or(s.feed_rate),
        spindle_speed: s.spindle_speed,
        corner: args.corner || s.corner,
        mode: if args.climb || s.climb {
            CuttingMode::Climb
        } else {
            CuttingMode::Conventional
        },
    };

    let gcode = SpoilboardSurfacingGenerator::new(params).generate()?;
    out.write_all(gcode.as_bytes())?;
    Ok(())
}

fn laser(pattern: &LaserCommand, config: &Config, out: &mut dyn Write) -> Result<()> {
    let l = &config.laser;
    let gcode = match pattern {
        LaserCommand::Power {
            power,
            feed,
            size,
            beam_diameter,
            overlap,
        } => SpiralFillGenerator::new(SpiralFillParameters {
            box_size: size.unwrap_or(l.box_size),
            power: power.unwrap_or(l.power),
            beam_diameter: beam_diameter.unwrap_or(l.beam_diameter),
            overlap: overlap.unwrap_or(l.overlap),
            feed_rate: feed.unwrap_or(l.feed_rate),
        })
        .generate()?,
        LaserCommand::Focus {
            power,
            feed,
            focal_length,
            z_min,
            z_max,
        } => FocusRampGenerator::new(FocusRampParameters {
            power: power.unwrap_or(l.focus_power),
            feed_rate: feed.unwrap_or(l.focus_feed_rate),
            focal_length: focal_length.unwrap_or(l.focal_length),
            z_min: z_min.unwrap_or(l.focus_z_min),
            z_max: z_max.unwrap_or(l.focus_z_max),
        })
        .generate()?,
        LaserCommand::Triangle { size, power, feed } => triangle_pattern(
            *size,
            power.unwrap_or(l.power),
            feed.unwrap_or(l.feed_rate),
        )?,
    };

    out.write_all(gcode.as_bytes())?;
    Ok(())
}
