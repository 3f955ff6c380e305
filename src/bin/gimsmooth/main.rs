//! gimsmooth CLI - geometry image filtering command-line tool.
//!
//! Usage: gimsmooth <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `gimsmooth --help` for available commands. Set `RUST_LOG=debug` for
//! per-iteration logging.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use gimsmooth::algo::domain_transform::curvature_map;
use gimsmooth::algo::filter::{self, FilterMode, FilterOptions};
use gimsmooth::algo::noise::{add_noise, NoiseOptions};
use gimsmooth::algo::normals_blur::NormalsBlur;
use gimsmooth::algo::Progress;
use gimsmooth::gim::{shapes, GeometryImage, GimMesh};
use gimsmooth::io;

#[derive(Parser)]
#[command(name = "gimsmooth")]
#[command(author, version, about = "Geometry image filtering CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display geometry image information
    Info {
        /// Input .gim file
        input: PathBuf,

        /// Show curvature statistics
        #[arg(long)]
        curvature: bool,
    },

    /// Smooth a geometry image
    Filter {
        /// Input .gim file
        input: PathBuf,

        /// Output file (.gim, .obj, .txt or .png)
        output: PathBuf,

        /// Filter mode
        #[arg(short, long, value_enum, default_value = "curvature")]
        mode: Mode,

        /// Number of iterations
        #[arg(short, long, default_value = "3")]
        iterations: usize,

        /// Spatial factor (reach of the filter, in cells)
        #[arg(short, long, default_value = "50.0")]
        spatial: f64,

        /// Range factor (smaller values preserve more features)
        #[arg(short, long, default_value = "0.2")]
        range: f64,

        /// Blur normals with this spatial factor before building the curvature transform
        #[arg(long)]
        blur_normals: Option<f64>,

        /// Number of normal blur iterations
        #[arg(long, default_value = "3")]
        blur_normals_iterations: usize,

        /// Do not blur the curvature transform
        #[arg(long)]
        no_domain_blur: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Add Gaussian noise to a geometry image
    Noise {
        /// Input .gim file
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Standard deviation of the noise along each axis
        #[arg(short, long, default_value = "0.01")]
        intensity: f64,

        /// Random seed for reproducible noise
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Convert a geometry image to another format
    Export {
        /// Input .gim file
        input: PathBuf,

        /// Output file (.gim, .obj, .txt or .png)
        output: PathBuf,

        /// Write the curvature map as a greyscale PNG instead
        #[arg(long)]
        curvature: bool,
    },

    /// Check that glued border cells agree
    Check {
        /// Input .gim file
        input: PathBuf,

        /// Largest accepted distance between glued cells
        #[arg(short, long, default_value = "1e-5")]
        tolerance: f64,
    },

    /// Generate a synthetic geometry image
    Generate {
        /// Output file
        output: PathBuf,

        /// Shape to generate
        #[arg(long, value_enum, default_value = "sphere")]
        shape: Shape,

        /// Side length of the grid (odd, at least 3)
        #[arg(short = 'n', long, default_value = "129")]
        size: usize,

        /// Sphere radius or cube half extent
        #[arg(long, default_value = "1.0")]
        radius: f64,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Uniform recursive filter
    Plain,
    /// Feature-preserving filter driven by normal differences
    Curvature,
    /// Feature-preserving filter driven by position distances
    Distance,
}

impl From<Mode> for FilterMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Plain => FilterMode::Plain,
            Mode::Curvature => FilterMode::Curvature,
            Mode::Distance => FilterMode::Distance,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Shape {
    /// Octahedral sphere
    Sphere,
    /// Octahedral cube (sharp edges)
    Cube,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input, curvature } => {
            cmd_info(&input, curvature)?;
        }

        Commands::Filter {
            input,
            output,
            mode,
            iterations,
            spatial,
            range,
            blur_normals,
            blur_normals_iterations,
            no_domain_blur,
            sequential,
        } => {
            let mut options = FilterOptions::default()
                .with_mode(mode.into())
                .with_iterations(iterations)
                .with_spatial_factor(spatial)
                .with_range_factor(range)
                .with_parallel(!sequential);
            if let Some(factor) = blur_normals {
                options = options.with_normals_blur(
                    NormalsBlur::default()
                        .with_spatial_factor(factor)
                        .with_iterations(blur_normals_iterations),
                );
            }
            if no_domain_blur {
                options = options.with_domain_blur(None);
            }
            cmd_filter(&input, &output, &options)?;
        }

        Commands::Noise {
            input,
            output,
            intensity,
            seed,
        } => {
            cmd_noise(&input, &output, intensity, seed)?;
        }

        Commands::Export {
            input,
            output,
            curvature,
        } => {
            cmd_export(&input, &output, curvature)?;
        }

        Commands::Check { input, tolerance } => {
            cmd_check(&input, tolerance)?;
        }

        Commands::Generate {
            output,
            shape,
            size,
            radius,
        } => {
            cmd_generate(&output, shape, size, radius)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only move forward.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (raw_percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, raw_percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn load(input: &PathBuf) -> Result<GeometryImage, Box<dyn std::error::Error>> {
    let gim = io::load(input)?;
    println!("Loaded: {}x{} geometry image", gim.size(), gim.size());
    Ok(gim)
}

fn cmd_info(input: &PathBuf, show_curvature: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut gim = io::load(input)?;
    let size = gim.size();

    println!("File: {}", input.display());
    println!("Grid: {}x{} ({} cells)", size, size, size * size);

    let mesh = GimMesh::from_geometry_image(&gim);
    println!("Surface points: {}", mesh.num_vertices());
    println!("Triangles: {}", mesh.num_triangles());
    println!("Euler characteristic: {}", mesh.euler_characteristic());

    let (min, max) = gim.bounding_box();
    println!(
        "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
        min.x, min.y, min.z, max.x, max.y, max.z
    );
    let diag = max - min;
    println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);

    let mismatches = gim.border_mismatches(1e-5);
    if mismatches.is_empty() {
        println!("Borders: consistent");
    } else {
        println!("Borders: {} mismatched pairs", mismatches.len());
    }

    if show_curvature {
        gim.update_normals();
        if let Some(normals) = gim.normals() {
            let map = curvature_map(normals);
            let values = map.as_slice();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let max = values.iter().copied().fold(0.0_f64, f64::max);
            println!("\nCurvature (normal difference):");
            println!("  Mean: {:.6}", mean);
            println!("  Max: {:.6}", max);
        }
    }

    Ok(())
}

fn cmd_filter(
    input: &PathBuf,
    output: &PathBuf,
    options: &FilterOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    options.validate()?;
    let gim = load(input)?;

    let mode = if options.parallel { "parallel" } else { "sequential" };
    println!(
        "Applying {:?} filter ({} iterations, spatial={}, range={}, {})...",
        options.mode, options.iterations, options.spatial_factor, options.range_factor, mode
    );
    let progress = create_progress();

    let start = Instant::now();
    let filtered = filter::filter_with_progress(&gim, options, &progress);
    let elapsed = start.elapsed();

    io::save(&filtered, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_noise(
    input: &PathBuf,
    output: &PathBuf,
    intensity: f64,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let gim = load(input)?;

    let options = NoiseOptions { intensity, seed };
    println!("Adding noise (intensity={})...", intensity);
    let noisy = add_noise(&gim, &options);

    io::save(&noisy, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_export(
    input: &PathBuf,
    output: &PathBuf,
    curvature: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut gim = load(input)?;

    if curvature {
        gim.update_normals();
        if let Some(normals) = gim.normals() {
            io::png::save_scalar_field(&curvature_map(normals), output)?;
        }
    } else {
        io::save(&gim, output)?;
    }
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_check(input: &PathBuf, tolerance: f64) -> Result<(), Box<dyn std::error::Error>> {
    let gim = load(input)?;

    let mismatches = gim.border_mismatches(tolerance);
    if mismatches.is_empty() {
        println!("All glued border cells agree (tolerance {})", tolerance);
        return Ok(());
    }

    for m in mismatches.iter().take(20) {
        println!(
            "  ({}, {}) vs ({}, {}): distance {:.6e}",
            m.cell.0, m.cell.1, m.partner.0, m.partner.1, m.distance
        );
    }
    if mismatches.len() > 20 {
        println!("  ... and {} more", mismatches.len() - 20);
    }
    Err(format!("{} glued border pairs disagree", mismatches.len()).into())
}

fn cmd_generate(
    output: &PathBuf,
    shape: Shape,
    size: usize,
    radius: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    gimsmooth::gim::validate_shape(size, size)?;

    let gim = match shape {
        Shape::Sphere => shapes::octahedral_sphere(size, radius),
        Shape::Cube => shapes::octahedral_cube(size, radius),
    };
    println!("Generated: {}x{} geometry image", size, size);

    io::save(&gim, output)?;
    println!("Saved: {}", output.display());

    Ok(())
}
