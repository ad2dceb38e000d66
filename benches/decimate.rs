//! Benchmarks for mesh simplification.

use criterion::{criterion_group, criterion_main, Criterion};
use chamfer::prelude::*;
use nalgebra::Point3;

fn create_grid_mesh(n: usize) -> TriangleMesh {
    let mut mesh = TriangleMesh::with_capacity(1e-5, (n + 1) * (n + 1), n * n * 2);

    // Create grid vertices
    for j in 0..=n {
        for i in 0..=n {
            mesh.add_vertex(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    // Create triangles
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            mesh.add_triangle(j as u32, v00, v10, v11);
            mesh.add_triangle(j as u32, v00, v11, v01);
        }
    }

    mesh
}

fn bench_connectivity_construction(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("connectivity_grid_50x50", |b| {
        b.iter(|| MeshConnectivity::from_mesh(&mesh).unwrap());
    });
}

fn bench_simplify(c: &mut Criterion) {
    let mesh = create_grid_mesh(30);
    let target = mesh.triangle_count() / 4;
    let options = SimplifyOptions::with_target_triangles(target);

    c.bench_function("simplify_grid_30x30_quarter", |b| {
        b.iter(|| simplify(&mesh, &options).unwrap());
    });
}

criterion_group!(benches, bench_connectivity_construction, bench_simplify);
criterion_main!(benches);
