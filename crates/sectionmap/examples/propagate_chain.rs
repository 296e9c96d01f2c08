use sectionmap::io::read_sections_json;
use sectionmap::propagate_point;
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <sections.json> <x> <y>", args[0]);
        std::process::exit(2);
    }

    let quads = read_sections_json(Path::new(&args[1]))?;
    let start = [args[2].parse::<f64>()?, args[3].parse::<f64>()?];

    let points = propagate_point(&quads, start)?;
    println!("section   0: ({:.2}, {:.2})", start[0], start[1]);
    for (i, p) in points.iter().enumerate() {
        println!("section {:>3}: ({:.2}, {:.2})", i + 1, p[0], p[1]);
    }
    Ok(())
}
