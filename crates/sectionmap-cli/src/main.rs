//! sectionmap CLI — section-chain mapping, contour refinement and focus maps.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use sectionmap::{ContourOptimizerConfig, FocusSurface, InterpolationMethod, Quad};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "sectionmap")]
#[command(
    about = "Geometry tools for serial-section correlative microscopy (section mapping, contour fitting, focus maps)"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Propagate a point of interest through a chain of section outlines.
    Propagate(CliPropagateArgs),

    /// Refine section outlines onto the edges of an image.
    Optimize(CliOptimizeArgs),

    /// Print the edge-alignment score of each section outline.
    Score(CliScoreArgs),

    /// Interpolate a focus file onto its dense grid.
    FocusGrid(CliFocusArgs),

    /// Interpolated focus height at one stage position.
    FocusQuery {
        #[command(flatten)]
        focus: CliFocusArgs,
        /// Stage x.
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        /// Stage y.
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
    },
}

#[derive(Debug, Clone, Args)]
struct CliPropagateArgs {
    /// Section outlines (JSON array of 4-corner quads, in cutting order).
    #[arg(long)]
    sections: PathBuf,
    /// Point x in the first section (pixels).
    #[arg(long, allow_hyphen_values = true)]
    x: f64,
    /// Point y in the first section (pixels).
    #[arg(long, allow_hyphen_values = true)]
    y: f64,
    /// Write the propagated points here (JSON) instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliImageArgs {
    /// Path to the overview image.
    #[arg(long)]
    image: PathBuf,
    /// Section outlines (JSON).
    #[arg(long)]
    sections: PathBuf,
    /// Convert the image to a Sobel edge response blurred with this sigma.
    /// Without it the image is used as-is (must already be an edge image).
    #[arg(long)]
    edge_sigma: Option<f32>,
    /// Optimizer config JSON; missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override edge sample spacing (pixels).
    #[arg(long)]
    edge_sample_distance: Option<f64>,
}

#[derive(Debug, Clone, Args)]
struct CliOptimizeArgs {
    #[command(flatten)]
    input: CliImageArgs,
    /// Only refine this section (0-based).
    #[arg(long)]
    section: Option<usize>,
    /// Override maximum iterations.
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Override the gradient step size.
    #[arg(long)]
    step_size: Option<f64>,
    /// Override the convergence threshold (pixels).
    #[arg(long)]
    threshold: Option<f64>,
    /// Path to write the refined sections (JSON).
    #[arg(long)]
    out: PathBuf,
    /// Path to write per-section optimization reports (JSON).
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliScoreArgs {
    #[command(flatten)]
    input: CliImageArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    /// Natural neighbor if compiled in, else IDW.
    Auto,
    Idw,
    NaturalNeighbor,
}

#[derive(Debug, Clone, Args)]
struct CliFocusArgs {
    /// Focus file (`xmin xmax ymin ymax step` header, then `x y z` lines).
    #[arg(long)]
    focus: PathBuf,
    /// Interpolation strategy.
    #[arg(long, value_enum, default_value_t = MethodArg::Auto)]
    method: MethodArg,
    /// IDW power (>= 1).
    #[arg(long, default_value = "1.0")]
    power: f64,
    /// Path to write the result (JSON) instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl CliFocusArgs {
    fn to_method(&self) -> InterpolationMethod {
        match self.method {
            MethodArg::Auto => InterpolationMethod::preferred(),
            MethodArg::Idw => InterpolationMethod::InverseDistance { power: self.power },
            MethodArg::NaturalNeighbor => InterpolationMethod::NaturalNeighbor,
        }
    }

    fn load_surface(&self) -> CliResult<FocusSurface> {
        let (domain, samples) = sectionmap::io::read_focus_file(&self.focus)?;
        tracing::info!(
            "Loaded {} focus samples from {}",
            samples.len(),
            self.focus.display()
        );
        let mut surface = FocusSurface::with_method(domain, self.to_method())?;
        surface.load(domain, samples)?;
        Ok(surface)
    }
}

fn load_optimizer_config(path: Option<&Path>) -> CliResult<ContourOptimizerConfig> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .map_err(|e| -> CliError { format!("Failed to read {}: {}", p.display(), e).into() })?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(ContourOptimizerConfig::default()),
    }
}

fn load_edge_image(args: &CliImageArgs) -> CliResult<sectionmap::contour::preprocess::EdgeResponse> {
    tracing::info!("Loading image: {}", args.image.display());
    let img = image::open(&args.image).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", args.image.display(), e).into()
    })?;
    let (w, h) = (img.width(), img.height());
    tracing::info!("Image size: {}x{}", w, h);

    match args.edge_sigma {
        Some(sigma) => Ok(sectionmap::contour::preprocess::edge_response(
            &img.to_luma8(),
            sigma,
        )),
        None => Ok(img.to_luma32f()),
    }
}

fn write_or_print(out: Option<&Path>, json: &str) -> CliResult<()> {
    match out {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Propagate(args) => run_propagate(&args),
        Commands::Optimize(args) => run_optimize(&args),
        Commands::Score(args) => run_score(&args),
        Commands::FocusGrid(args) => run_focus_grid(&args),
        Commands::FocusQuery { focus, x, y } => run_focus_query(&focus, [x, y]),
    }
}

// ── propagate ──────────────────────────────────────────────────────────

fn run_propagate(args: &CliPropagateArgs) -> CliResult<()> {
    let quads = sectionmap::io::read_sections_json(&args.sections)?;
    let n_reordered = quads.iter().filter(|q| q.was_reordered()).count();
    if n_reordered > 0 {
        tracing::warn!(
            n_reordered,
            "some sections were given in reverse corner order and were reordered"
        );
    }

    let points = sectionmap::propagate_point(&quads, [args.x, args.y])?;
    tracing::info!(
        "Propagated ({:.2}, {:.2}) through {} sections",
        args.x,
        args.y,
        quads.len()
    );

    write_or_print(args.out.as_deref(), &serde_json::to_string_pretty(&points)?)
}

// ── optimize ───────────────────────────────────────────────────────────

#[derive(serde::Serialize)]
struct SectionReport {
    section: usize,
    #[serde(flatten)]
    result: sectionmap::ContourOptimization,
}

fn run_optimize(args: &CliOptimizeArgs) -> CliResult<()> {
    let edges = load_edge_image(&args.input)?;
    let mut quads = sectionmap::io::read_sections_json(&args.input.sections)?;

    let mut config = load_optimizer_config(args.input.config.as_deref())?;
    if let Some(v) = args.input.edge_sample_distance {
        config.edge_sample_distance = v;
    }
    if let Some(v) = args.max_iterations {
        config.max_iterations = v;
    }
    if let Some(v) = args.step_size {
        config.gradient_step_size = v;
    }
    if let Some(v) = args.threshold {
        config.vertex_distance_threshold = v;
    }

    let selected: Vec<usize> = match args.section {
        Some(i) if i < quads.len() => vec![i],
        Some(i) => {
            return Err(format!("section {} out of range ({} sections)", i, quads.len()).into())
        }
        None => (0..quads.len()).collect(),
    };

    let mut reports = Vec::with_capacity(selected.len());
    for i in selected {
        let (refined, result): (Quad, _) = sectionmap::optimize_quad(&edges, &quads[i], &config)?;
        tracing::info!(
            "Section {}: {} iterations, converged={}, score {:.1} -> {:.1}",
            i,
            result.iterations,
            result.converged,
            result.initial_score,
            result.final_score
        );
        quads[i] = refined;
        reports.push(SectionReport { section: i, result });
    }

    sectionmap::io::write_sections_json(&args.out, &quads)?;
    tracing::info!("Refined sections written to {}", args.out.display());

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&reports)?)?;
        tracing::info!("Report written to {}", path.display());
    }
    Ok(())
}

// ── score ──────────────────────────────────────────────────────────────

fn run_score(args: &CliScoreArgs) -> CliResult<()> {
    let edges = load_edge_image(&args.input)?;
    let quads = sectionmap::io::read_sections_json(&args.input.sections)?;
    let mut config = load_optimizer_config(args.input.config.as_deref())?;
    if let Some(v) = args.input.edge_sample_distance {
        config.edge_sample_distance = v;
    }
    config.validate()?;

    for (i, q) in quads.iter().enumerate() {
        let score = sectionmap::contour_score(&edges, q.corners(), config.edge_sample_distance);
        println!("section {:>3}: score {:.3}", i, score);
    }
    Ok(())
}

// ── focus-grid / focus-query ───────────────────────────────────────────

#[derive(serde::Serialize)]
struct GridOutput {
    domain: sectionmap::FocusDomain,
    method: InterpolationMethod,
    values: Vec<Vec<f64>>,
}

fn run_focus_grid(args: &CliFocusArgs) -> CliResult<()> {
    let mut surface = args.load_surface()?;
    let method = surface.method();
    let grid = surface.grid_samples()?;
    if let Some((lo, hi)) = grid.range() {
        tracing::info!(
            "Focus grid {}x{}, z in [{:.4}, {:.4}]",
            grid.domain().nx(),
            grid.domain().ny(),
            lo,
            hi
        );
    }

    let out = GridOutput {
        domain: *grid.domain(),
        method,
        values: grid.to_rows(),
    };
    write_or_print(args.out.as_deref(), &serde_json::to_string_pretty(&out)?)
}

fn run_focus_query(args: &CliFocusArgs, pos: [f64; 2]) -> CliResult<()> {
    let mut surface = args.load_surface()?;
    let z = surface.point_sample(pos)?;
    let json = serde_json::to_string_pretty(&serde_json::json!({
        "x": pos[0],
        "y": pos[1],
        "z": z,
        "method": surface.method(),
    }))?;
    write_or_print(args.out.as_deref(), &json)
}
