use criterion::{black_box, criterion_group, criterion_main, Criterion};
use frost_climate::{
    annular_sector, distance, idw_weights, ols_intercepts, ring_radius, search_circle, Point,
    Quadrant,
};

fn bench_geometry(c: &mut Criterion) {
    let oslo = Point::new(59.91, 10.75).with_elevation(23.0);
    let lillehammer = Point::new(61.115, 10.466).with_elevation(180.0);
    let ring = annular_sector(&oslo, ring_radius(3), Quadrant::NorthEast);

    c.bench_function("distance", |b| {
        b.iter(|| distance(black_box(&oslo), black_box(&lillehammer)))
    });
    c.bench_function("search_circle", |b| b.iter(|| search_circle(black_box(&oslo), 20.0)));
    c.bench_function("polygon_contains", |b| {
        b.iter(|| ring.contains(black_box(&lillehammer)))
    });
}

fn bench_fusion(c: &mut Criterion) {
    let distances = [4.2, 17.9, 23.5, 38.0];
    let samples: Vec<(f64, Vec<f64>)> = (0..8)
        .map(|i| {
            let d = 5.0 + i as f64 * 7.5;
            (d, (0..12).map(|m| m as f64 - d * 0.05).collect())
        })
        .collect();

    c.bench_function("idw_weights", |b| b.iter(|| idw_weights(black_box(&distances))));
    c.bench_function("ols_intercepts", |b| b.iter(|| ols_intercepts(black_box(&samples))));
}

criterion_group!(benches, bench_geometry, bench_fusion);
criterion_main!(benches);
