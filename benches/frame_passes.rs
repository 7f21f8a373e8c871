use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use tree_backdrop::particles::{ParticleConfig, ParticleSystem};
use tree_backdrop::render::SoftwareRenderer;
use tree_backdrop::scene::{Camera, SceneGraph};
use tree_backdrop::theme::Theme;
use tree_backdrop::tree::{TreeBuilder, TreeProfile};

fn scene_with_leaves(count: usize) -> (SceneGraph, ParticleSystem) {
    let camera = Camera::new(Vec3::new(0.0, 3.0, 8.0), Vec3::new(0.0, 3.0, 0.0), 75.0, 16.0 / 9.0, 0.1, 1000.0);
    let mut scene = SceneGraph::new(camera, Theme::Light.palette().environment());
    let mut rng = StdRng::seed_from_u64(42);
    TreeBuilder::build(&TreeProfile::default(), &mut scene, &mut rng).expect("default tree is valid");
    let config = ParticleConfig {
        count,
        ..ParticleConfig::default()
    };
    let particles = ParticleSystem::build(&config, &mut scene, &mut rng).expect("default leaves are valid");
    (scene, particles)
}

fn bench_particle_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_update");

    for count in [100, 1_000, 10_000] {
        let (mut scene, mut particles) = scene_with_leaves(count);
        let mut elapsed = 0.0f32;
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                elapsed += 1.0 / 60.0;
                black_box(particles.update(&mut scene, 1.0 / 60.0, elapsed))
            })
        });
    }

    group.finish();
}

fn bench_software_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("software_render");
    group.sample_size(20);

    let (scene, _) = scene_with_leaves(100);
    for (width, height) in [(320, 180), (1280, 720)] {
        let mut renderer = SoftwareRenderer::new(width, height);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &(width, height),
            |b, _| b.iter(|| black_box(renderer.draw(&scene).pixels().len())),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_particle_update, bench_software_render);
criterion_main!(benches);
