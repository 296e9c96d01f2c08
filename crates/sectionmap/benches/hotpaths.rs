use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sectionmap::{
    contour_score, optimize_contour, propagate_point, ContourOptimizerConfig, FocusDomain,
    FocusSample, FocusSurface, InterpolationMethod, Quad,
};

fn make_section_chain(n: usize, seed: u64) -> Vec<Quad> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let x0 = i as f64 * 120.0;
            let mut jitter = || rng.gen_range(-8.0..8.0);
            Quad::new([
                [x0 + 10.0 + jitter(), 10.0 + jitter()],
                [x0 + 110.0 + jitter(), 10.0 + jitter()],
                [x0 + 110.0 + jitter(), 90.0 + jitter()],
                [x0 + 10.0 + jitter(), 90.0 + jitter()],
            ])
            .expect("finite corners")
        })
        .collect()
}

fn make_ridge_fixture(w: u32, h: u32, corners: &[[f64; 2]; 4], half_width: f64) -> GrayImage {
    let mut img = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let p = [x as f64, y as f64];
            let mut d = f64::INFINITY;
            for i in 0..4 {
                let a = corners[i];
                let b = corners[(i + 1) % 4];
                let ab = [b[0] - a[0], b[1] - a[1]];
                let t = (((p[0] - a[0]) * ab[0] + (p[1] - a[1]) * ab[1])
                    / (ab[0] * ab[0] + ab[1] * ab[1]))
                    .clamp(0.0, 1.0);
                d = d.min((p[0] - a[0] - t * ab[0]).hypot(p[1] - a[1] - t * ab[1]));
            }
            let v = (1.0 - d / half_width).max(0.0);
            img.put_pixel(x, y, Luma([(20.0 * v).round() as u8]));
        }
    }
    img
}

fn make_focus_samples(n: usize, seed: u64) -> Vec<FocusSample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x = rng.gen_range(0.0..1000.0);
            let y = rng.gen_range(0.0..1000.0);
            FocusSample::new(x, y, 0.01 * x - 0.02 * y + rng.gen_range(-0.5..0.5))
        })
        .collect()
}

fn bench_propagate(c: &mut Criterion) {
    let chain = make_section_chain(200, 3);
    c.bench_function("propagate_200_sections", |b| {
        b.iter(|| {
            let pts = propagate_point(black_box(&chain), black_box([55.0, 48.0]));
            black_box(pts.map(|p| p.len()).unwrap_or(0))
        })
    });
}

fn bench_contour(c: &mut Criterion) {
    let truth = [[50.0, 50.0], [150.0, 50.0], [150.0, 150.0], [50.0, 150.0]];
    let img = make_ridge_fixture(200, 200, &truth, 10.0);
    let init = [[45.0, 45.0], [155.0, 45.0], [155.0, 155.0], [45.0, 155.0]];
    let cfg = ContourOptimizerConfig {
        edge_sample_distance: 10.0,
        vertex_distance_threshold: 0.05,
        ..Default::default()
    };

    c.bench_function("contour_score_200x200", |b| {
        b.iter(|| black_box(contour_score(black_box(&img), black_box(&init), 10.0)))
    });

    c.bench_function("optimize_contour_200x200", |b| {
        b.iter(|| {
            let res = optimize_contour(black_box(&img), black_box(&init), black_box(&cfg));
            black_box(res.map(|r| r.iterations).unwrap_or(0))
        })
    });
}

fn bench_focus(c: &mut Criterion) {
    let samples = make_focus_samples(25, 11);
    let domain = FocusDomain::new(0.0, 1000.0, 0.0, 1000.0, 10.0).expect("valid domain");

    for (name, method) in [
        ("focus_grid_idw_100x100", InterpolationMethod::InverseDistance { power: 2.0 }),
        ("focus_grid_natural_neighbor_100x100", InterpolationMethod::NaturalNeighbor),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| {
                let mut surface = FocusSurface::with_method(domain, method).expect("valid method");
                surface.load(domain, samples.clone()).expect("finite samples");
                let grid = surface.grid_samples().map(|g| g.values().len());
                black_box(grid.unwrap_or(0))
            })
        });
    }
}

criterion_group!(hotpaths, bench_propagate, bench_contour, bench_focus);
criterion_main!(hotpaths);
