//! BHV culling against brute-force per-instance tests.
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use soft3d::{BhvConfig, BhvTree, Camera, CullPlanes, MeshId, SceneInstance};

fn scatter(rng: &mut ChaCha8Rng, count: usize, extent: f32) -> Vec<SceneInstance> {
    (0..count)
        .map(|i| {
            let position = Vec3::new(
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent * 0.1..extent * 0.1),
                rng.gen_range(-extent..extent),
            );
            SceneInstance::new(MeshId(i % 7), position, rng.gen_range(0.5..8.0))
        })
        .collect()
}

fn config() -> BhvConfig {
    BhvConfig {
        divisions: 3,
        max_depth: 4,
        min_objects: 2,
        world_radius: 1000.0,
    }
}

#[test]
fn frustum_holding_the_whole_scene_culls_nothing() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xB4_0001);
    let mut instances = scatter(&mut rng, 400, 100.0);
    let mut tree = BhvTree::build(&instances, config()).unwrap();

    let mut camera = Camera::new(Vec3::new(0.0, 300.0, 400.0), 1.0).with_clip_distances(1.0, 5000.0);
    camera.look_at(Vec3::ZERO, Vec3::Y);

    tree.reset(&mut instances);
    let culled = tree.frustum_cull(&camera, CullPlanes::XYZ, &mut instances);
    assert_eq!(culled, 0);
    assert!(instances.iter().all(|i| !i.is_culled()));
    assert_eq!(tree.nodes_visited(), tree.node_count());
}

#[test]
fn frustum_holding_nothing_culls_everything() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xB4_0002);
    let mut instances = scatter(&mut rng, 400, 100.0);
    let mut tree = BhvTree::build(&instances, config()).unwrap();

    let mut camera = Camera::new(Vec3::new(0.0, 0.0, 500.0), 1.0);
    camera.look_at(Vec3::new(0.0, 0.0, 1000.0), Vec3::Y);

    tree.reset(&mut instances);
    let culled = tree.frustum_cull(&camera, CullPlanes::XYZ, &mut instances);
    assert_eq!(culled, instances.len());
    assert!(instances.iter().all(|i| i.is_culled()));
}

#[test]
fn bhv_never_culls_an_individually_visible_instance() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xB4_0003);
    let plane_sets = [
        CullPlanes::XYZ,
        CullPlanes::X,
        CullPlanes::Z,
        CullPlanes::X | CullPlanes::Z,
        CullPlanes::Y,
    ];

    for _ in 0..50 {
        let mut instances = scatter(&mut rng, 300, 400.0);
        let mut tree = BhvTree::build(&instances, config()).unwrap();

        let mut camera = Camera::new(
            Vec3::new(
                rng.gen_range(-300.0..300.0),
                rng.gen_range(0.0..60.0),
                rng.gen_range(-300.0..300.0),
            ),
            rng.gen_range(0.75..2.0),
        )
        .with_clip_distances(1.0, rng.gen_range(50.0..600.0));
        camera.set_orientation(rng.gen_range(-3.1..3.1), rng.gen_range(-0.5..0.5));
        let frustum = camera.extract_frustum();
        let planes = plane_sets[rng.gen_range(0..plane_sets.len())];

        tree.reset(&mut instances);
        tree.frustum_cull(&camera, planes, &mut instances);

        for instance in &instances {
            let mut fresh = *instance;
            fresh.state.remove(soft3d::ObjectState::CULLED);
            let individually_culled = fresh.cull(&frustum, planes);
            if instance.is_culled() {
                assert!(
                    individually_culled,
                    "BHV culled {:?} which is visible on its own",
                    instance.position
                );
            }
        }
        assert!(tree.nodes_visited() >= 1);
    }
}

#[test]
fn reset_between_frames_drops_stale_flags() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xB4_0004);
    let mut instances = scatter(&mut rng, 200, 100.0);
    let mut tree = BhvTree::build(&instances, config()).unwrap();

    let mut away = Camera::new(Vec3::new(0.0, 0.0, 500.0), 1.0);
    away.look_at(Vec3::new(0.0, 0.0, 1000.0), Vec3::Y);
    tree.reset(&mut instances);
    tree.frustum_cull(&away, CullPlanes::XYZ, &mut instances);
    assert_eq!(tree.culled_count(), instances.len());

    let mut overview = Camera::new(Vec3::new(0.0, 300.0, 400.0), 1.0).with_clip_distances(1.0, 5000.0);
    overview.look_at(Vec3::ZERO, Vec3::Y);
    tree.reset(&mut instances);
    tree.frustum_cull(&overview, CullPlanes::XYZ, &mut instances);
    assert!(instances.iter().all(|i| !i.is_culled()));
    assert_eq!(tree.culled_count(), 0);
}
