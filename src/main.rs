use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use corridor;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct ConstraintsLoadError(PathBuf, #[source] corridor::reader::Error);

#[derive(Debug, thiserror::Error)]
#[error("missing {0} point: pass it on the command line or in the constraints file")]
struct MissingEndpoint(&'static str);

#[derive(Parser)]
#[command(version, about, allow_negative_numbers = true)]
struct Cli {
    /// The path to the GeoJSON constraints file (optionally gzip- or bzip2-compressed)
    constraints_file: PathBuf,

    /// Latitude of the start point
    start_lat: Option<f64>,

    /// Longitude of the start point
    start_lon: Option<f64>,

    /// Latitude of the end point
    end_lat: Option<f64>,

    /// Longitude of the end point
    end_lon: Option<f64>,

    /// Sampling area as min_lon,min_lat,max_lon,max_lat.
    /// Defaults to the box around the start and end points, extended by --margin.
    #[arg(long, value_delimiter = ',', num_args = 4)]
    bbox: Option<Vec<f64>>,

    /// Margin (in degrees) around the start and end points used when --bbox is not given
    #[arg(long, default_value_t = 0.5)]
    margin: f64,

    /// Maximum number of planner iterations
    #[arg(long, default_value_t = corridor::PlannerOptions::default().max_iterations)]
    max_iterations: usize,

    /// Maximum length of a single route segment, in degrees
    #[arg(long, default_value_t = corridor::PlannerOptions::default().step_size)]
    step_size: f64,

    /// Probability of steering directly towards the end point
    #[arg(long, default_value_t = corridor::PlannerOptions::default().goal_sample_rate)]
    goal_sample_rate: f64,

    /// Distance (in degrees) from the end point at which the route is considered complete
    #[arg(long, default_value_t = corridor::PlannerOptions::default().max_distance_to_goal)]
    goal_distance: f64,

    /// Radius (in degrees) of the neighborhood considered when rewiring the tree
    #[arg(long, default_value_t = corridor::PlannerOptions::default().rewire_radius)]
    rewire_radius: f64,

    /// Propagate cost improvements to all descendants of rewired vertices
    #[arg(long)]
    propagate: bool,

    /// Seed of the random number generator; random if not provided
    #[arg(long)]
    seed: Option<u64>,

    /// Number of iterations between progress reports
    #[arg(long, default_value_t = corridor::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    colog::default_builder()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    let bbox = match cli.bbox.as_deref() {
        Some(&[left, bottom, right, top]) => [left, bottom, right, top],
        _ => [0.0; 4],
    };

    let (mut obstacles, report) = load_constraints(&cli.constraints_file)?;

    let start = match (cli.start_lat, cli.start_lon) {
        (Some(lat), Some(lon)) => corridor::Point::new(lon, lat),
        _ => report.start.ok_or(MissingEndpoint("start"))?,
    };

    let end = match (cli.end_lat, cli.end_lon) {
        (Some(lat), Some(lon)) => corridor::Point::new(lon, lat),
        _ => report.end.ok_or(MissingEndpoint("end"))?,
    };

    let bounds = match corridor::Bounds::around([start, end], cli.margin) {
        Some(b) if bbox == [0.0; 4] => b,
        _ => corridor::Bounds::from_bbox(bbox)?,
    };

    // Steering towards the end point may leave the sampling area
    let planning_area = bounds.including([start, end]);
    let dropped = obstacles.retain_intersecting(&planning_area);
    log::debug!("dropped {} obstacles outside of {:?}", dropped, planning_area);

    let seed = cli.seed.unwrap_or_else(rand::random);
    log::info!("using seed {}", seed);

    let options = corridor::PlannerOptions {
        max_iterations: cli.max_iterations,
        step_size: cli.step_size,
        goal_sample_rate: cli.goal_sample_rate,
        max_distance_to_goal: cli.goal_distance,
        rewire_radius: cli.rewire_radius,
        rewire_mode: if cli.propagate {
            corridor::RewireMode::Propagate
        } else {
            corridor::RewireMode::SingleHop
        },
    };

    let route = corridor::find_route(
        start,
        end,
        obstacles,
        bounds,
        options,
        StdRng::seed_from_u64(seed),
        cli.batch_size,
    )?;

    let coordinates: Vec<[f64; 2]> = route.path.iter().map(|p| [p.x, p.y]).collect();
    let output = serde_json::json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {
                "cost": route.cost,
                "reached_goal": route.reached_goal,
                "iterations": route.iterations,
                "length_km": corridor::path_length_km(&route.path),
                "seed": seed,
            },
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            },
        }],
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_constraints<P: AsRef<Path>>(
    path: P,
) -> Result<(corridor::ObstacleSet, corridor::reader::Report), ConstraintsLoadError> {
    let mut obstacles = corridor::ObstacleSet::default();
    let options = corridor::reader::Options {
        profile: &corridor::DEFAULT_PROFILE,
        file_format: corridor::reader::FileFormat::Unknown,
        bbox: [0.0; 4],
    };
    match corridor::reader::add_obstacles_from_file(&mut obstacles, &options, path.as_ref()) {
        Ok(report) => Ok((obstacles, report)),
        Err(e) => Err(ConstraintsLoadError(PathBuf::from(path.as_ref()), e)),
    }
}
