use clap::{Parser, Subcommand};
use site_survey::{
    config::EditorConfig,
    dtm::{ContourSummary, Tin},
    geometry::{DefaultGeometry, Point},
    io::{project::read_project_json, read_points_csv, read_points_csv_3d},
    surveying::{CheckPoint, DisplayPrefs, Join, StakeoutInfo},
};

#[derive(Parser)]
#[command(name = "site_survey_cli", version)]
struct Cli {
    /// Report coordinates as (N, E)
    #[arg(long, global = true)]
    swap_xy: bool,
    /// Report bearings from south
    #[arg(long, global = true)]
    south_azimuth: bool,
    /// Decimal places for distances and coordinates
    #[arg(long, default_value_t = 3, global = true)]
    decimals: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inverse between two points.
    Join { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Bearing and distance from a project's station to one of its pegs.
    Stakeout { project: String, peg: String },
    /// Contour a surface built from an x,y,z CSV file.
    Contours {
        input: String,
        #[arg(long, default_value_t = 1.0)]
        interval: f64,
        #[arg(long, default_value_t = 5)]
        major_factor: u32,
    },
    /// Cut and fill of an x,y,z CSV surface against a flat design level.
    Volume {
        input: String,
        #[arg(long, default_value_t = 0.0)]
        design_level: f64,
        /// CSV of x,y boundary vertices
        #[arg(long)]
        boundary: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the contents of a saved project.
    ProjectSummary { path: String },
    /// Print the effective editor settings for a settings file.
    Settings { path: String },
}

fn fail(msg: String) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn load_surface(input: &str) -> Tin {
    let points = read_points_csv_3d(input).unwrap_or_else(|e| fail(format!("Error reading {}: {}", input, e)));
    Tin::build(points, &DefaultGeometry::new()).unwrap_or_else(|e| fail(format!("Error building surface: {}", e)))
}

fn main() {
    env_logger::Builder::from_default_env().init();
    let cli = Cli::parse();
    let prefs = DisplayPrefs {
        swap_xy: cli.swap_xy,
        south_azimuth: cli.south_azimuth,
        decimals: cli.decimals,
    };
    match cli.command {
        Commands::Join { x1, y1, x2, y2 } => {
            let join = Join::between(Point::new(x1, y1), Point::new(x2, y2), &prefs);
            println!("{}", join.report(&prefs));
        }
        Commands::Stakeout { project, peg } => {
            let drawing = read_project_json(&project)
                .unwrap_or_else(|e| fail(format!("Error reading {}: {}", project, e)))
                .to_drawing();
            let target = drawing
                .find_peg(&peg)
                .and_then(|i| drawing.peg(i))
                .unwrap_or_else(|| fail(format!("No peg named {}", peg)));
            match StakeoutInfo::compute(&drawing.setup, &target.name, target.position, &prefs) {
                Some(info) => println!("{}", info.summary(&prefs)),
                None => fail("Set station point first".to_string()),
            }
            if drawing.setup.has_backsight() {
                if let Some(check) = CheckPoint::compute(&drawing.setup, &target.name, target.position) {
                    println!("Turn angle: {:.4}\u{00B0}", check.turn_angle);
                }
            }
        }
        Commands::Contours {
            input,
            interval,
            major_factor,
        } => {
            let tin = load_surface(&input);
            let contours = tin
                .contours(interval, major_factor)
                .unwrap_or_else(|e| fail(format!("Error contouring: {}", e)));
            for c in &contours {
                println!(
                    "{:.*} {} {} segments",
                    prefs.decimals,
                    c.elevation,
                    if c.is_major { "major" } else { "minor" },
                    c.segment_count()
                );
            }
            println!("{}", ContourSummary::of(&contours));
        }
        Commands::Volume {
            input,
            design_level,
            boundary,
            json,
        } => {
            let tin = load_surface(&input);
            let ring = boundary.map(|path| {
                read_points_csv(&path).unwrap_or_else(|e| fail(format!("Error reading {}: {}", path, e)))
            });
            let report = tin
                .cut_fill(design_level, ring.as_deref(), &DefaultGeometry::new())
                .unwrap_or_else(|e| fail(format!("Error computing volume: {}", e)));
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{}", text),
                    Err(e) => fail(format!("Error writing JSON: {}", e)),
                }
            } else {
                println!("{}", report);
            }
        }
        Commands::ProjectSummary { path } => match read_project_json(&path) {
            Ok(project) => {
                let drawing = project.to_drawing();
                println!("Saved: {}", project.saved_at.to_rfc3339());
                println!("Layers: {}", drawing.layers.len());
                for layer in drawing.layers.iter() {
                    let count = drawing.polylines().iter().filter(|p| p.layer == layer.name).count();
                    println!("  {} ({} polylines)", layer.name, count);
                }
                println!("Polylines: {}", drawing.polylines().len());
                println!("Pegs: {}", drawing.pegs().len());
                if let Some(station) = &drawing.setup.station {
                    println!("Station: {} {}", station.name, prefs.format_point(station.position));
                }
            }
            Err(e) => fail(format!("Error reading {}: {}", path, e)),
        },
        Commands::Settings { path } => match EditorConfig::load_or_default(&path) {
            Ok(config) => match serde_json::to_string_pretty(&config) {
                Ok(text) => println!("{}", text),
                Err(e) => fail(format!("Error writing JSON: {}", e)),
            },
            Err(e) => fail(format!("Error reading {}: {}", path, e)),
        },
    }
}
