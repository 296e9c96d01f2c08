use sectionmap::io::read_focus_file;
use sectionmap::{FocusSurface, InterpolationMethod};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <focus.txt> [idw_power]", args[0]);
        std::process::exit(2);
    }

    let (domain, samples) = read_focus_file(Path::new(&args[1]))?;
    let method = match args.get(2) {
        Some(power) => InterpolationMethod::InverseDistance {
            power: power.parse()?,
        },
        None => InterpolationMethod::preferred(),
    };

    let mut surface = FocusSurface::with_method(domain, method)?;
    surface.load(domain, samples)?;
    let grid = surface.grid_samples()?;

    println!(
        "{:?}: {}x{} nodes, step {}",
        method,
        domain.nx(),
        domain.ny(),
        domain.step()
    );
    if let Some((lo, hi)) = grid.range() {
        println!("focus range: [{lo:.4}, {hi:.4}]");
    }
    Ok(())
}
