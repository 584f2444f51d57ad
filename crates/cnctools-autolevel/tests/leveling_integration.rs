use std::io::Write;

use cnctools_autolevel::{
    apply_height_map, apply_height_map_file, apply_height_map_to_writer, probe_grid,
    scan_boundaries_file, scan_boundaries_str, HeightMap, Leveler, ProbeGrid, SimulatedProbe,
    SurfaceModel,
};
use cnctools_core::{CorrectionMode, Point3D, Position};
use proptest::prelude::*;
use tempfile::NamedTempFile;

const PROGRAM: &str = "\
G21
G90
G10 L20 P1 X0 Y0 Z0
G0 Z5
G0 X0 Y0
G1 Z-1 F100
G1 X40
G1 Y30

G1 X0
M5
";

fn write_program(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_empty_program_has_sentinel_bounds() {
    let bounds = scan_boundaries_str("G21\nG90\nM3 S1000\nM5\n");
    assert!(bounds.is_empty());
    assert!(bounds.min_x > bounds.max_x);
    assert!(bounds.min_y > bounds.max_y);
    assert!(bounds.min_z > bounds.max_z);
}

#[test]
fn test_scan_file_and_missing_file() {
    let file = write_program(PROGRAM);
    let bounds = scan_boundaries_file(file.path()).unwrap();
    assert_eq!((bounds.min_x, bounds.max_x), (0.0, 40.0));
    assert_eq!((bounds.min_y, bounds.max_y), (0.0, 30.0));
    assert_eq!((bounds.min_z, bounds.max_z), (-1.0, 5.0));

    let err = scan_boundaries_file("/definitely/not/here.nc").unwrap_err();
    assert!(err.is_io_error());
}

#[test]
fn test_probe_then_level_flat_surface() {
    let bounds = scan_boundaries_str(PROGRAM);
    let grid = ProbeGrid::from_bounds(&bounds, 5, 4).unwrap();
    let mut probe = SimulatedProbe::new(SurfaceModel::flat(0.5));
    let map = probe_grid(&mut probe, &grid).unwrap();
    assert_eq!(map.len(), 20);
    assert_eq!(probe.transcript().len(), 40);

    let out = apply_height_map(PROGRAM, &map).unwrap();
    assert_eq!(out.len(), PROGRAM.lines().count());
    assert_eq!(out[0], "G21");
    assert_eq!(out[2], "G10 L20 P1 X0 Y0 Z0");
    assert_eq!(out[3], "G0 Z5 ; 5.000 + 0.500 -> 5.500");
    assert_eq!(out[6], "G1 X40 ; -1.000 + 0.500 -> -0.500");
    assert_eq!(out[8], "");
    assert_eq!(out[10], "M5 ; -1.000 + 0.500 -> -0.500");
}

#[test]
fn test_file_and_string_paths_agree() {
    let file = write_program(PROGRAM);
    let map: HeightMap = [(0.0, 0.0, 0.1), (40.0, 0.0, 0.3), (0.0, 30.0, -0.2)]
        .into_iter()
        .map(|(x, y, z)| Point3D::new(x, y, z))
        .collect();

    let from_file = apply_height_map_file(file.path(), &map, CorrectionMode::Annotate).unwrap();
    assert_eq!(from_file, apply_height_map(PROGRAM, &map).unwrap());
}

#[test]
fn test_writer_keeps_prefix_on_failure() {
    // Two samples only: exact hits work, anything else cannot be fitted.
    let map = HeightMap::from_points(vec![
        Point3D::new(0.0, 0.0, 0.0),
        Point3D::new(40.0, 0.0, 0.2),
    ]);
    let program = "G0 X0 Y0\nG1 X40\nG1 Y30\nG1 X0\n";
    let mut output = Vec::new();

    let err = apply_height_map_to_writer(
        program.as_bytes(),
        &map,
        CorrectionMode::Annotate,
        &mut output,
    )
    .unwrap_err();

    assert!(err.is_leveling_error());
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "G0 X0 Y0 ; 0.000 + 0.000 -> 0.000\nG1 X40 ; 0.000 + 0.200 -> 0.200\n"
    );
}

#[test]
fn test_writer_reports_stats() {
    let map = HeightMap::from_points(vec![
        Point3D::new(0.0, 0.0, 0.0),
        Point3D::new(50.0, 0.0, 0.0),
        Point3D::new(0.0, 50.0, 0.0),
    ]);
    let mut output = Vec::new();
    let stats = apply_height_map_to_writer(
        PROGRAM.as_bytes(),
        &map,
        CorrectionMode::Rewrite,
        &mut output,
    )
    .unwrap();

    assert_eq!(stats.lines_read, 11);
    // G21, G90, G10 and the blank line are copied; M5 has no axis words.
    assert_eq!(stats.lines_passed_through, 5);
    assert_eq!(stats.lines_leveled, 6);

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("G1 X40 Z-1.000\n"));
    assert!(text.contains("G1 Z-1.000 F100\n"));
}

const LATIN1_PROGRAM: &[u8] = b"G0 X0 Y0 Z5 ; 90\xB0 corner\nG1 X10 Y10 Z-1\n";

#[test]
fn test_scan_file_with_latin1_comment() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(LATIN1_PROGRAM).unwrap();

    let bounds = scan_boundaries_file(file.path()).unwrap();
    assert_eq!((bounds.min_x, bounds.max_x), (0.0, 10.0));
    assert_eq!((bounds.min_y, bounds.max_y), (0.0, 10.0));
    assert_eq!((bounds.min_z, bounds.max_z), (-1.0, 5.0));
}

#[test]
fn test_writer_preserves_latin1_comment() {
    let map = HeightMap::from_points(vec![
        Point3D::new(0.0, 0.0, 0.0),
        Point3D::new(10.0, 0.0, 0.0),
        Point3D::new(0.0, 10.0, 0.0),
    ]);

    let mut output = Vec::new();
    apply_height_map_to_writer(LATIN1_PROGRAM, &map, CorrectionMode::Annotate, &mut output)
        .unwrap();
    assert_eq!(
        output,
        b"G0 X0 Y0 Z5 ; 90\xB0 corner ; 5.000 + 0.000 -> 5.000\n\
          G1 X10 Y10 Z-1 ; -1.000 + 0.000 -> -1.000\n"
    );

    let mut output = Vec::new();
    apply_height_map_to_writer(LATIN1_PROGRAM, &map, CorrectionMode::Rewrite, &mut output)
        .unwrap();
    assert_eq!(
        output,
        b"G0 X0 Y0 Z5.000 ; 90\xB0 corner\nG1 X10 Y10 Z-1.000\n"
    );
}

proptest! {
    #[test]
    fn prop_axes_carry_over_between_lines(
        x1 in -100i32..100, y1 in -100i32..100, z1 in -10i32..10,
        x2 in -100i32..100,
    ) {
        let map = HeightMap::from_points(vec![
            Point3D::new(-200.0, -200.0, 0.0),
            Point3D::new(200.0, -200.0, 0.0),
            Point3D::new(0.0, 200.0, 0.0),
        ]);
        let mut leveler = Leveler::new(&map, CorrectionMode::Annotate);
        leveler.process_line(&format!("G1 X{} Y{} Z{}", x1, y1, z1)).unwrap();
        leveler.process_line(&format!("G1 X{}", x2)).unwrap();
        prop_assert_eq!(
            leveler.position(),
            Position::new(x2 as f64, y1 as f64, z1 as f64)
        );
    }
}
