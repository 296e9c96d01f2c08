use image::ImageReader;
use sectionmap::contour::preprocess::edge_response;
use sectionmap::{optimize_contour, reduce_polygon, ContourOptimizerConfig};
use std::error::Error;

/// Reduce a traced outline to 4 corners and fit them onto the image edges.
fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <image.png> <outline.json> [sigma]", args[0]);
        std::process::exit(2);
    }

    let gray = ImageReader::open(&args[1])?.decode()?.to_luma8();
    let outline: Vec<[f64; 2]> = serde_json::from_str(&std::fs::read_to_string(&args[2])?)?;
    let sigma: f32 = args.get(3).map(|s| s.parse()).transpose()?.unwrap_or(2.0);

    let initial = reduce_polygon(&outline, 4, 0.0);
    let edges = edge_response(&gray, sigma);
    let result = optimize_contour(&edges, &initial, &ContourOptimizerConfig::default())?;

    println!(
        "{} iterations, converged={}, score {:.1} -> {:.1}",
        result.iterations, result.converged, result.initial_score, result.final_score
    );
    println!("{}", serde_json::to_string_pretty(&result.vertices)?);
    Ok(())
}
