//! # cnctools Autolevel
//!
//! Corrects a G-code program for an uneven work surface.
//!
//! ## Pipeline
//!
//! 1. **Bounds** - scan the program for the extent of its coordinates
//! 2. **Probe** - sample the surface height over that extent
//! 3. **Height map** - estimate the height anywhere from the nearest samples
//! 4. **Apply** - walk the program, tracking the tool position, and correct
//!    every motion line for the surface under it
//!
//! ```
//! use cnctools_autolevel::{apply_height_map, HeightMap};
//! use cnctools_core::Point3D;
//!
//! let map = HeightMap::from_points(vec![
//!     Point3D::new(0.0, 0.0, 0.1),
//!     Point3D::new(10.0, 0.0, 0.1),
//!     Point3D::new(0.0, 10.0, 0.1),
//! ]);
//! let leveled = apply_height_map("G1 X5 Y5 Z-1", &map).unwrap();
//! assert_eq!(leveled[0], "G1 X5 Y5 Z-1 ; -1.000 + 0.100 -> -0.900");
//! ```

pub mod apply;
pub mod bounds;
pub mod coords;
pub mod heightmap;
pub mod probe;

pub use apply::{
    apply_height_map, apply_height_map_file, apply_height_map_reader, apply_height_map_to_writer,
    apply_height_map_with_mode, Leveler, LevelingStats,
};
pub use bounds::{scan_boundaries, scan_boundaries_file, scan_boundaries_str};
pub use coords::{extract_position, is_passthrough_line, Axis, IGNORED_PREFIXES};
pub use heightmap::{HeightEstimate, HeightMap, HeightSource};
pub use probe::{
    generate_probe_program, probe_grid, ProbeGrid, ProbeProgramParameters, SimulatedProbe,
    SurfaceModel, SurfaceProbe,
};
