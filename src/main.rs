//! terrain-obj CLI - heightmap to OBJ converter.
//!
//! Loads PNG or RAW heightmaps, builds a terrain mesh for each and writes
//! one OBJ file per heightmap.

use clap::{Parser, Subcommand, ValueEnum};
use glam::{BVec3, Vec3};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use terrain_obj::export::{export_terrains, BatchReport};
use terrain_obj::mesh::{ExportOptions, MeshResolution, OutputGrid, PolygonTopology};
use terrain_obj::terrain::{load_heightfield, RawFormat, Terrain};

/// Terrain heightmap to Wavefront OBJ converter.
#[derive(Parser)]
#[command(name = "terrain-obj")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert heightmaps into OBJ meshes.
    Export {
        /// Heightmap files (.png, .raw, .r16, .r32). The file stem names the terrain.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Existing folder to write `<name>.obj` files into.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Create the output folder if it does not exist.
        #[arg(long)]
        create_output: bool,

        /// Terrain size as X,Y,Z (Y scales the normalized heights).
        #[arg(long, default_value = "1000,600,1000", value_parser = parse_vec3, allow_hyphen_values = true)]
        size: Vec3,

        /// Terrain position in the world as X,Y,Z.
        #[arg(long, default_value = "0,0,0", value_parser = parse_vec3, allow_hyphen_values = true)]
        origin: Vec3,

        /// Polygon type.
        #[arg(short, long, default_value = "triangles")]
        topology: TopologyArg,

        /// Mesh density relative to the heightmap.
        #[arg(short, long, default_value = "half")]
        resolution: ResolutionArg,

        /// Do not add the terrain position to the vertices.
        #[arg(long)]
        no_world_offset: bool,

        /// Flip vertex positions along X.
        #[arg(long)]
        flip_x: bool,

        /// Flip vertex positions along Y.
        #[arg(long)]
        flip_y: bool,

        /// Flip vertex positions along Z.
        #[arg(long)]
        flip_z: bool,

        /// Flip positions before adding the terrain position instead of after.
        #[arg(long)]
        flip_before_offset: bool,

        /// Flip texture coordinates along U.
        #[arg(long)]
        flip_uv_x: bool,

        /// Flip texture coordinates along V.
        #[arg(long)]
        flip_uv_y: bool,

        /// Accepted for symmetry; texture coordinates are 2-D.
        #[arg(long)]
        flip_uv_z: bool,

        /// Sample encoding for RAW inputs (default: from extension, else r16).
        #[arg(long)]
        raw_format: Option<RawFormatArg>,
    },

    /// Display mesh sizes for a heightmap resolution.
    Info {
        /// Heightmap samples per side (e.g., 513, 1025, 2049).
        #[arg(short, long, default_value = "513")]
        samples: u32,

        /// Only show this mesh resolution.
        #[arg(short, long)]
        resolution: Option<ResolutionArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TopologyArg {
    /// Two triangles per grid cell.
    Triangles,
    /// One quad per grid cell.
    Quads,
}

impl From<TopologyArg> for PolygonTopology {
    fn from(arg: TopologyArg) -> Self {
        match arg {
            TopologyArg::Triangles => PolygonTopology::Triangles,
            TopologyArg::Quads => PolygonTopology::Quads,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ResolutionArg {
    /// Every sample.
    Full,
    /// Every 2nd sample.
    Half,
    /// Every 4th sample.
    Quarter,
    /// Every 8th sample.
    Eighth,
    /// Every 16th sample.
    Sixteenth,
}

impl From<ResolutionArg> for MeshResolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Full => MeshResolution::Full,
            ResolutionArg::Half => MeshResolution::Half,
            ResolutionArg::Quarter => MeshResolution::Quarter,
            ResolutionArg::Eighth => MeshResolution::Eighth,
            ResolutionArg::Sixteenth => MeshResolution::Sixteenth,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RawFormatArg {
    /// 16-bit unsigned, little-endian (Unity).
    R16,
    /// 16-bit unsigned, big-endian.
    R16Be,
    /// 32-bit float, little-endian.
    R32,
}

impl From<RawFormatArg> for RawFormat {
    fn from(arg: RawFormatArg) -> Self {
        match arg {
            RawFormatArg::R16 => RawFormat::R16LittleEndian,
            RawFormatArg::R16Be => RawFormat::R16BigEndian,
            RawFormatArg::R32 => RawFormat::R32Float,
        }
    }
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected X,Y,Z but got '{}'", s));
    }

    let mut v = [0.0f32; 3];
    for (slot, part) in v.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("invalid component '{}': {}", part, e))?;
    }
    Ok(Vec3::from_array(v))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("terrain_obj=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            inputs,
            output,
            create_output,
            size,
            origin,
            topology,
            resolution,
            no_world_offset,
            flip_x,
            flip_y,
            flip_z,
            flip_before_offset,
            flip_uv_x,
            flip_uv_y,
            flip_uv_z,
            raw_format,
        } => {
            let options = ExportOptions {
                topology: topology.into(),
                resolution: resolution.into(),
                include_world_offset: !no_world_offset,
                flip_position: BVec3::new(flip_x, flip_y, flip_z),
                flip_before_offset,
                flip_uv: BVec3::new(flip_uv_x, flip_uv_y, flip_uv_z),
            };
            run_export(
                &inputs,
                &output,
                create_output,
                size,
                origin,
                raw_format.map(RawFormat::from),
                &options,
            );
        }
        Commands::Info { samples, resolution } => {
            run_info(samples, resolution.map(MeshResolution::from));
        }
    }
}

fn run_export(
    inputs: &[PathBuf],
    output: &Path,
    create_output: bool,
    size: Vec3,
    origin: Vec3,
    raw_format: Option<RawFormat>,
    options: &ExportOptions,
) {
    if size.x <= 0.0 || size.z <= 0.0 {
        eprintln!("Error: Terrain size must be positive along X and Z");
        std::process::exit(1);
    }

    if options.flip_before_offset && !options.include_world_offset {
        eprintln!("Warning: --flip-before-offset has no effect with --no-world-offset");
    }

    println!("terrain-obj - Heightmap to OBJ");
    println!("==============================");
    println!("Inputs: {}", inputs.len());
    println!("Output: {}", output.display());
    println!(
        "Topology: {:?}, resolution: {:?} (every {} samples)",
        options.topology,
        options.resolution,
        options.downsample_factor()
    );

    if create_output {
        std::fs::create_dir_all(output).unwrap_or_else(|e| {
            eprintln!("Error creating output directory: {}", e);
            std::process::exit(1);
        });
    }

    let start = Instant::now();

    println!("\nLoading heightmaps...");
    let mut terrains = Vec::with_capacity(inputs.len());
    let mut load_failures = 0;
    for path in inputs {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        match load_heightfield(path, raw_format, size) {
            Ok(field) => {
                println!("  {}: {}x{} samples", name, field.width, field.height);
                terrains.push(Terrain::new(name, field.with_world_origin(origin)));
            }
            Err(e) => {
                eprintln!("  Error loading {}: {}", path.display(), e);
                load_failures += 1;
            }
        }
    }

    if terrains.is_empty() {
        eprintln!("Error: No heightmaps could be loaded");
        std::process::exit(1);
    }

    println!("\nWriting OBJ files...");
    let report = export_terrains(&terrains, output, options).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    for path in report.written() {
        println!("  Wrote {}", path.display());
    }
    for (name, e) in report.failures() {
        eprintln!("  Error writing terrain {}: {}", name, e);
    }

    println!("\n{} in {:.2?}", export_summary(&report, load_failures), start.elapsed());

    if report.succeeded() == 0 {
        std::process::exit(1);
    }
}

/// Summary line for a finished batch. Totals count loaded terrains only;
/// inputs that failed to load are listed separately.
fn export_summary(report: &BatchReport, load_failures: usize) -> String {
    let mut line = format!("Successfully wrote {} terrains", report);
    if load_failures > 0 {
        line.push_str(&format!(" ({} heightmaps could not be loaded)", load_failures));
    }
    line
}

fn run_info(samples: u32, resolution: Option<MeshResolution>) {
    if samples < 2 {
        eprintln!("Error: A heightmap needs at least 2 samples per side");
        std::process::exit(1);
    }

    println!("terrain-obj - Mesh Information");
    println!("==============================");
    println!("Heightmap: {}x{} samples", samples, samples);

    let resolutions: Vec<MeshResolution> = match resolution {
        Some(r) => vec![r],
        None => MeshResolution::all().to_vec(),
    };

    for res in resolutions {
        let grid = OutputGrid::new(samples, samples, res.downsample_factor());
        println!("\n{:?} (every {} samples):", res, grid.factor);
        println!("  Grid: {}x{} vertices", grid.width, grid.height);
        println!("  Vertices: {}", grid.vertex_count());
        println!("  Triangles: {}", grid.face_count(PolygonTopology::Triangles));
        println!("  Quads: {}", grid.face_count(PolygonTopology::Quads));
        if !grid.fits_u32_indices() {
            println!("  Note: too many vertices for 32-bit face indices");
        }
        if !grid.covers_source(samples, samples) {
            let dropped = samples - 1 - (grid.width - 1) * grid.factor;
            println!("  Note: last {} sample rows/columns are not reached", dropped);
        }
    }
}
