/// BHV build and per-frame reset + cull costs
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use soft3d::{BhvConfig, BhvTree, Camera, CullPlanes, MeshId, SceneInstance};

fn scene(count: usize) -> Vec<SceneInstance> {
    let mut rng = ChaCha8Rng::seed_from_u64(count as u64);
    (0..count)
        .map(|i| {
            let position = Vec3::new(
                rng.gen_range(-5000.0..5000.0),
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-5000.0..5000.0),
            );
            SceneInstance::new(MeshId(i % 16), position, rng.gen_range(1.0..20.0))
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("bhv_build");
    for count in [256usize, 4096, 16384] {
        let instances = scene(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &instances, |b, instances| {
            b.iter(|| BhvTree::build(black_box(instances), BhvConfig::default()));
        });
    }
    group.finish();
}

fn bench_cull_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("bhv_cull_frame");
    let mut camera = Camera::new(Vec3::new(0.0, 100.0, 0.0), 16.0 / 9.0).with_clip_distances(1.0, 3000.0);
    camera.look_at(Vec3::new(1000.0, 0.0, 1000.0), Vec3::Y);

    for count in [256usize, 4096, 16384] {
        let mut instances = scene(count);
        let mut tree = match BhvTree::build(&instances, BhvConfig::default()) {
            Ok(tree) => tree,
            Err(err) => panic!("{}", err),
        };
        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            b.iter(|| {
                tree.reset(&mut instances);
                tree.frustum_cull(black_box(&camera), CullPlanes::XYZ, &mut instances)
            });
        });
    }
    group.finish();
}

fn bench_brute_force_cull(c: &mut Criterion) {
    let frustum = {
        let mut camera = Camera::new(Vec3::new(0.0, 100.0, 0.0), 16.0 / 9.0).with_clip_distances(1.0, 3000.0);
        camera.look_at(Vec3::new(1000.0, 0.0, 1000.0), Vec3::Y);
        camera.extract_frustum()
    };
    let mut instances = scene(16384);
    c.bench_function("per_instance_cull_16384", |b| {
        b.iter(|| {
            instances
                .iter_mut()
                .map(|i| i.cull(black_box(&frustum), CullPlanes::XYZ))
                .filter(|&culled| culled)
                .count()
        });
    });
}

criterion_group!(benches, bench_build, bench_cull_frame, bench_brute_force_cull);
criterion_main!(benches);
