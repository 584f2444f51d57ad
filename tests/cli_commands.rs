use std::io::Write;

use clap::Parser;
use cnctools::autolevel::HeightMap;
use cnctools::cli::{Cli, ExportFormat};
use cnctools::commands::{execute, export_height_map};
use cnctools::settings::Config;
use cnctools::{CorrectionMode, Point3D};
use tempfile::{NamedTempFile, TempDir};

const PROGRAM: &str = "G21\nG90\nG0 Z5\nG0 X0 Y0\nG1 Z-1 F100\nG1 X40\nG1 Y30\nG1 X0\nM5\n";

fn run(args: &[&str], config: &Config) -> anyhow::Result<(String, String)> {
    let cli = Cli::try_parse_from(std::iter::once("cnctools").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    let mut report = Vec::new();
    execute(&cli.command, config, &mut out, &mut report)?;
    Ok((String::from_utf8(out)?, String::from_utf8(report)?))
}

fn program_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(PROGRAM.as_bytes()).unwrap();
    file
}

#[test]
fn test_bounds_command() {
    let file = program_file();
    let path = file.path().to_str().unwrap();
    let (out, _) = run(&["bounds", "-f", path], &Config::default()).unwrap();

    assert!(out.starts_with("Bounds:\n"));
    assert!(out.contains("XMax: 40.000"));
    assert!(out.contains("Zmin: -1.000"));
}

#[test]
fn test_autolevel_with_simulated_probe() {
    let file = program_file();
    let path = file.path().to_str().unwrap();
    let (out, report) = run(
        &["autolevel", "-f", path, "--offset", "0.25"],
        &Config::default(),
    )
    .unwrap();

    assert!(report.contains("Height Map:\n"));
    assert_eq!(out.lines().count(), PROGRAM.lines().count());
    assert!(out.starts_with("G21\nG90 ; 0.000 + 0.250 -> 0.250\n"));
    assert!(out.contains("G1 X40 ; -1.000 + 0.250 -> -0.750\n"));
}

#[test]
fn test_autolevel_rewrite_from_height_map_file() {
    let dir = TempDir::new().unwrap();
    let program = program_file();
    let map_path = dir.path().join("map.json");
    std::fs::write(
        &map_path,
        r#"[{"X":0,"Y":0,"Z":0.5},{"X":40,"Y":0,"Z":0.5},{"X":0,"Y":30,"Z":0.5}]"#,
    )
    .unwrap();
    let out_path = dir.path().join("leveled.nc");

    let (out, report) = run(
        &[
            "autolevel",
            "-f",
            program.path().to_str().unwrap(),
            "--heightmap",
            map_path.to_str().unwrap(),
            "--mode",
            "rewrite",
            "--export",
            "csv",
            "-o",
            out_path.to_str().unwrap(),
        ],
        &Config::default(),
    )
    .unwrap();

    assert!(out.is_empty());
    assert!(report.contains("40.000,0.000,0.500\n"));
    let leveled = std::fs::read_to_string(&out_path).unwrap();
    assert!(leveled.contains("G1 X40 Z-0.500\n"));
    assert!(leveled.contains("G1 Z-0.500 F100\n"));
}

#[test]
fn test_autolevel_mode_flag_overrides_config() {
    let file = program_file();
    let path = file.path().to_str().unwrap();
    let mut config = Config::default();
    config.leveling.mode = CorrectionMode::Rewrite;

    let (out, _) = run(&["autolevel", "-f", path], &config).unwrap();
    assert!(out.contains("G1 X40 Z-1.000\n"));

    let (out, _) = run(&["autolevel", "-f", path, "--mode", "annotate"], &config).unwrap();
    assert!(out.contains("G1 X40 ; -1.000 + 0.000 -> -1.000\n"));
}

#[test]
fn test_autolevel_missing_file_fails() {
    let err = run(
        &["autolevel", "-f", "/no/such/program.nc"],
        &Config::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Failed to scan"));
}

#[test]
fn test_probe_command_uses_config_grid() {
    let mut config = Config::default();
    config.probing.rows = 2;
    config.probing.cols = 2;

    let (out, _) = run(&["probe", "-X", "10", "-Y", "10"], &config).unwrap();
    assert_eq!(out.matches("G38.2 Z-5.0 F25").count(), 4);
    assert!(out.contains("\nG90 G0 X10.000 Y10.000\n"));
}

#[test]
fn test_spoilboard_flags_override_config() {
    let (out, _) = run(
        &["spoilboard", "-x", "30", "-y", "30", "-d", "1.5", "--climb"],
        &Config::default(),
    )
    .unwrap();
    assert!(out.contains("G1 Z-1.50 F25"));
    assert!(out.contains("G1 X0.00 Y30.00\nG1 X30.00 Y30.00\n"));
}

#[test]
fn test_laser_and_steps() {
    let config = Config::default();
    let (out, _) = run(&["laser", "triangle", "-s", "5"], &config).unwrap();
    assert!(out.contains("G1 X-5.00 Y-5.00 F500"));

    let (out, _) = run(&["laser", "focus"], &config).unwrap();
    assert!(out.contains("; 10: 45.00"));

    let (out, _) = run(&["steps", "-c", "80", "-a", "26"], &config).unwrap();
    assert_eq!(out, "New steps per mm: 76.923\n");
}

#[test]
fn test_export_formats() {
    let map = HeightMap::from_points(vec![Point3D::new(1.0, 2.0, 0.5)]);
    assert_eq!(
        export_height_map(&map, ExportFormat::Csv).unwrap(),
        "1.000,2.000,0.500\n"
    );
    assert_eq!(
        export_height_map(&map, ExportFormat::Pretty).unwrap(),
        "Height Map:\n   X: 1.000, Y: 2.000, Z: 0.500\n"
    );
    let json = export_height_map(&map, ExportFormat::Json).unwrap();
    assert!(json.contains("\"X\": 1.0"));
}
