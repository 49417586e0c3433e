//! CLI utility for baking and querying scene ground maps

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use glam::DVec2;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use groundmap::{load_bitmap, BuildContext, GroundMap, GroundMapConfig};

/// A CLI utility for ground map baking and pathfinding
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bake a ground map from a walkability image
    Bake {
        /// Input image; grey pixels are walkable
        #[clap(long, value_parser)]
        input: PathBuf,

        /// Output ground map file (.json for JSON, binary otherwise)
        #[clap(long, value_parser)]
        output: PathBuf,

        /// Depth of the darkest walkable grey
        #[clap(long, default_value = "0", allow_hyphen_values = true)]
        front_z: i32,

        /// Depth of the brightest walkable grey
        #[clap(long, default_value = "0", allow_hyphen_values = true)]
        back_z: i32,

        /// Maximum deviation, in pixels, of collapsed boundary vertices
        #[clap(long, default_value_t = groundmap::DEFAULT_BOUNDARY_PRECISION)]
        precision: f64,
    },

    /// Find a path on a baked ground map
    FindPath {
        /// Baked ground map file
        #[clap(long, value_parser)]
        map: PathBuf,

        /// Start position (x,y)
        #[clap(long, value_parser = parse_point, allow_hyphen_values = true)]
        start: DVec2,

        /// End position (x,y)
        #[clap(long, value_parser = parse_point, allow_hyphen_values = true)]
        end: DVec2,

        /// Output path file
        #[clap(long, value_parser)]
        output: Option<PathBuf>,
    },

    /// Sample the depth at a scene position
    Depth {
        /// Baked ground map file
        #[clap(long, value_parser)]
        map: PathBuf,

        /// Position (x,y)
        #[clap(long, value_parser = parse_point, allow_hyphen_values = true)]
        point: DVec2,
    },

    /// Print a summary of a baked ground map
    Info {
        /// Baked ground map file
        #[clap(long, value_parser)]
        map: PathBuf,
    },
}

/// Parse a comma-separated 2D point
fn parse_point(s: &str) -> Result<DVec2, String> {
    let parts: Vec<&str> = s.split(',').collect();

    if parts.len() != 2 {
        return Err(format!("Point must have 2 components, got {}", parts.len()));
    }

    let x = parts[0].trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = parts[1].trim().parse::<f64>().map_err(|e| e.to_string())?;

    Ok(DVec2::new(x, y))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Commands::Bake {
            input,
            output,
            front_z,
            back_z,
            precision,
        } => bake(
            &input,
            &output,
            GroundMapConfig::new(front_z, back_z).with_precision(precision),
        ),
        Commands::FindPath {
            map,
            start,
            end,
            output,
        } => find_path(&map, start, end, output.as_deref()),
        Commands::Depth { map, point } => depth(&map, point),
        Commands::Info { map } => info(&map),
    }
}

/// Bake a ground map from an image
fn bake(input: &Path, output: &Path, config: GroundMapConfig) -> Result<()> {
    log::info!("Loading bitmap from {}...", input.display());
    let bitmap = load_bitmap(input).map_err(|e| anyhow!("Failed to load bitmap: {}", e))?;
    log::info!("Bitmap loaded: {}x{}", bitmap.width(), bitmap.height());

    let mut ctx = BuildContext::with_progress_callback(|info| {
        log::info!("[{}/{}] {}", info.current, info.total, info.description);
    });
    let map = GroundMap::build_with_context(&bitmap, config, &mut ctx)
        .map_err(|e| anyhow!("Failed to build ground map: {}", e))?;
    ctx.log_timer_summary();

    let stats = map.stats();
    log::info!(
        "Ground map built: {} vertices ({} traced), {} boundary edges, {} shortcuts",
        stats.vertices,
        stats.raw_vertices,
        stats.boundary_edges,
        stats.shortcut_edges
    );

    log::info!("Saving ground map to {}...", output.display());
    if is_json(output) {
        map.save_to_json(output)
            .map_err(|e| anyhow!("Failed to save as JSON: {}", e))?;
    } else {
        map.save_to_binary(output)
            .map_err(|e| anyhow!("Failed to save as binary: {}", e))?;
    }

    Ok(())
}

/// Load a baked ground map, choosing the format from the extension
fn load_map(path: &Path) -> Result<GroundMap> {
    log::info!("Loading ground map from {}...", path.display());
    let map = if is_json(path) {
        GroundMap::load_from_json(path)
            .map_err(|e| anyhow!("Failed to load JSON ground map: {}", e))?
    } else {
        GroundMap::load_from_binary(path)
            .map_err(|e| anyhow!("Failed to load binary ground map: {}", e))?
    };
    Ok(map)
}

/// Find a path on a ground map
fn find_path(map_path: &Path, start: DVec2, end: DVec2, output: Option<&Path>) -> Result<()> {
    let map = load_map(map_path)?;

    log::info!("Finding path from {} to {}...", start, end);
    let path = map
        .find_path(start, end)
        .map_err(|e| anyhow!("Failed to find path: {}", e))?;
    log::info!("Found path with {} waypoints", path.len());

    if let Some(output_path) = output {
        log::info!("Saving path to {}...", output_path.display());

        let mut file = File::create(output_path)
            .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;

        writeln!(file, "# Path from {} to {}", start, end)?;
        writeln!(file, "# {} waypoints", path.len())?;
        for waypoint in &path {
            writeln!(
                file,
                "{},{},{}",
                waypoint.x,
                waypoint.y,
                map.z_at_point(*waypoint)
            )?;
        }
    } else {
        println!("Path:");
        for (i, waypoint) in path.iter().enumerate() {
            println!(
                "{}: {},{} (z={:.2})",
                i,
                waypoint.x,
                waypoint.y,
                map.z_at_point(*waypoint)
            );
        }
    }

    Ok(())
}

fn depth(map_path: &Path, point: DVec2) -> Result<()> {
    let map = load_map(map_path)?;
    let walkable = if map.is_ground_point(point) {
        "walkable"
    } else {
        "not walkable"
    };
    println!("{},{}: z={:.3} ({walkable})", point.x, point.y, map.z_at_point(point));
    Ok(())
}

fn info(map_path: &Path) -> Result<()> {
    let map = load_map(map_path)?;
    let config = map.config();
    let stats = map.stats();

    println!("Size:           {}x{}", map.width(), map.height());
    println!("Walkable:       {} pixels", map.mask().walkable_count());
    println!("Depth range:    front {} / back {}", config.front_z, config.back_z);
    println!("Precision:      {}", config.precision);
    println!(
        "Vertices:       {} ({} before simplification)",
        stats.vertices, stats.raw_vertices
    );
    println!(
        "Edges:          {} boundary, {} shortcut",
        stats.boundary_edges, stats.shortcut_edges
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("3.5, -2").unwrap(), DVec2::new(3.5, -2.0));
        assert!(parse_point("1,2,3").is_err());
        assert!(parse_point("x,1").is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert!(is_json(Path::new("scene.JSON")));
        assert!(!is_json(Path::new("scene.gmap")));
        assert!(!is_json(Path::new("scene")));
    }

    #[test]
    fn test_cli_parses_bake() {
        let args = Args::try_parse_from([
            "groundmap",
            "bake",
            "--input",
            "room.png",
            "--output",
            "room.gmap",
            "--front-z",
            "-100",
            "--back-z",
            "0",
        ])
        .unwrap();
        match args.command {
            Commands::Bake {
                front_z, precision, ..
            } => {
                assert_eq!(front_z, -100);
                assert_eq!(precision, groundmap::DEFAULT_BOUNDARY_PRECISION);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_every_argument_has_help() {
        use clap::CommandFactory;

        let command = Args::command();
        for sub in command.get_subcommands() {
            for arg in sub
                .get_arguments()
                .filter(|arg| !matches!(arg.get_id().as_str(), "help" | "version"))
            {
                assert!(
                    arg.get_help().is_some(),
                    "{} --{} has no help text",
                    sub.get_name(),
                    arg.get_id()
                );
            }
        }
    }
}
