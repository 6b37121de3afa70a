// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meshzip::{zip_meshes, Mesh, MeshTag, Scan, ZipperConfig};
use nalgebra::Point3;

fn grid(tag: u32, n: usize, z: impl Fn(f64, f64) -> f64) -> Mesh {
    let mut mesh = Mesh::new(MeshTag(tag));
    let mut ids = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            let (x, y) = (i as f64, j as f64);
            ids.push(mesh.make_vertex(Point3::new(x, y, z(x, y))));
        }
    }
    let w = n + 1;
    for j in 0..n {
        for i in 0..n {
            let a = ids[j * w + i];
            let b = ids[j * w + i + 1];
            let c = ids[(j + 1) * w + i + 1];
            let d = ids[(j + 1) * w + i];
            mesh.make_triangle(a, b, c, f64::INFINITY).unwrap();
            mesh.make_triangle(a, c, d, f64::INFINITY).unwrap();
        }
    }
    mesh
}

fn bench_hash_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_hash");

    group.bench_function("build_20x20", |b| {
        b.iter(|| {
            let mut mesh = grid(1, 20, |_, _| 0.0);
            mesh.build_hash(black_box(2.0));
            mesh
        });
    });

    group.finish();
}

fn bench_zip(c: &mut Criterion) {
    let mut group = c.benchmark_group("zip");
    let cfg = ZipperConfig {
        mesh_level: 0,
        resolution: 0.5,
        ..Default::default()
    };

    group.bench_function("flat_vs_tilted_10x10", |b| {
        b.iter(|| {
            let mut sc1 = Scan::new("flat");
            sc1.set_mesh(0, grid(1, 10, |_, _| 0.0));
            let mut sc2 = Scan::new("tilted");
            // crosses the flat grid along a skew line
            sc2.set_mesh(0, grid(2, 10, |x, y| 0.11 * (x - 4.3) + 0.07 * (y - 5.1)));
            zip_meshes(&mut sc1, &mut sc2, black_box(&cfg)).unwrap();
            sc1
        });
    });

    group.finish();
}

criterion_group!(benches, bench_hash_build, bench_zip);
criterion_main!(benches);
