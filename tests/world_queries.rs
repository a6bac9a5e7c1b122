//! Raycast, floor and path queries against generated and edited worlds.

use cgmath::{Point3, Vector3};
use voxel_world::{
    voxels::{
        pager::{EmptyPager, FlatPager, PerlinPager},
        voxel::{voxel_type::VoxelType, Voxel},
    },
    PathError, World, WorldConfig,
};

fn config() -> WorldConfig {
    WorldConfig {
        mesh_size: 16,
        chunk_side_length: 16,
        volume_memory_megabytes: 16,
        max_height: 32,
        worker_threads: 1,
        path_iteration_cap: 5_000,
        ..WorldConfig::default()
    }
}

#[test]
fn floor_of_a_flat_world_is_the_ground_height() {
    let world = World::new(config(), Box::new(FlatPager::new(9, VoxelType::Rock))).unwrap();
    for (x, z) in [(0, 0), (-17, 4), (100, -100)] {
        assert_eq!(world.find_floor(x, z, VoxelType::is_floor), Some(9));
    }
    assert_eq!(world.find_floor(0, 0, VoxelType::is_water), None);
}

#[test]
fn empty_world_has_no_floor() {
    let world = World::new(config(), Box::new(EmptyPager)).unwrap();
    assert_eq!(world.find_floor(5, 5, VoxelType::is_floor), None);
}

#[test]
fn leaves_are_not_a_floor() {
    let world = World::new(config(), Box::new(FlatPager::new(2, VoxelType::Grass))).unwrap();
    world.set_voxel(Point3::new(3, 12, 3), Voxel::new(VoxelType::Leaf, 0));
    assert_eq!(world.find_floor(3, 3, VoxelType::is_floor), Some(2));
    assert_eq!(world.find_floor(3, 3, VoxelType::is_blocked), Some(12));
}

#[test]
fn raycast_stops_exactly_at_a_placed_voxel() {
    let world = World::new(config(), Box::new(EmptyPager)).unwrap();
    let target = Point3::new(10, 5, 0);
    world.set_voxel(target, Voxel::new(VoxelType::Wood, 1));

    let mut hit = None;
    let interrupted = world.raycast(
        Point3::new(0.5, 5.5, 0.5),
        Vector3::new(1.0, 0.0, 0.0),
        20.0,
        |pos, voxel| {
            if voxel.material().is_blocked() {
                hit = Some(pos);
                return false;
            }
            true
        },
    );
    assert!(interrupted);
    assert_eq!(hit, Some(target));
}

#[test]
fn raycast_short_of_the_voxel_completes() {
    let world = World::new(config(), Box::new(EmptyPager)).unwrap();
    world.set_voxel(Point3::new(10, 5, 0), Voxel::new(VoxelType::Wood, 1));

    let interrupted = world.raycast(
        Point3::new(0.5, 5.5, 0.5),
        Vector3::new(1.0, 0.0, 0.0),
        8.0,
        |_, voxel| !voxel.material().is_blocked(),
    );
    assert!(!interrupted);
}

#[test]
fn picking_gives_the_placement_voxel() {
    let world = World::new(config(), Box::new(FlatPager::new(4, VoxelType::Sand))).unwrap();
    let pick = world.pick_voxel(
        Point3::new(2.5, 12.5, 2.5),
        Vector3::new(0.0, -20.0, 0.0),
        Voxel::air(),
    );
    assert_eq!(pick.hit_voxel, Some(Point3::new(2, 4, 2)));
    assert_eq!(pick.previous_voxel, Some(Point3::new(2, 5, 2)));
}

#[test]
fn path_detours_around_a_pillar() {
    let world = World::new(config(), Box::new(FlatPager::new(0, VoxelType::Rock))).unwrap();
    for y in 1..32 {
        world.set_voxel(Point3::new(3, y, 0), Voxel::new(VoxelType::Rock, 0));
    }
    let path = world
        .find_path(Point3::new(0, 1, 0), Point3::new(6, 1, 0))
        .unwrap();
    assert_eq!(path.first(), Some(&Point3::new(0, 1, 0)));
    assert_eq!(path.last(), Some(&Point3::new(6, 1, 0)));
    assert!(!path.contains(&Point3::new(3, 1, 0)));
    assert!(path.iter().all(|p| !world.get_material(*p).is_blocked()));
}

#[test]
fn path_to_a_buried_voxel_fails() {
    let world = World::new(config(), Box::new(FlatPager::new(8, VoxelType::Rock))).unwrap();
    assert_eq!(
        world.find_path(Point3::new(0, 9, 0), Point3::new(0, 3, 0)),
        Err(PathError::EndBlocked)
    );
}

#[test]
fn path_queries_respect_the_iteration_cap() {
    let config = WorldConfig {
        path_iteration_cap: 10,
        ..config()
    };
    let world = World::new(config, Box::new(FlatPager::new(0, VoxelType::Rock))).unwrap();
    assert_eq!(
        world.find_path(Point3::new(0, 1, 0), Point3::new(60, 1, 0)),
        Err(PathError::IterationCapExceeded { cap: 10 })
    );
}

#[test]
fn generated_terrain_has_a_floor_everywhere() {
    let config = WorldConfig {
        max_height: 64,
        seed: 7,
        ..config()
    };
    let world = World::new(config, Box::new(PerlinPager::new(64, 7))).unwrap();
    for x in (-40..40).step_by(13) {
        for z in (-40..40).step_by(11) {
            let floor = world.find_floor(x, z, VoxelType::is_blocked);
            assert!(floor.is_some_and(|y| (0..64).contains(&y)), "no ground at {x},{z}");
        }
    }
}

#[test]
fn client_data_adds_clouds_after_a_reset() {
    let config = WorldConfig {
        max_height: 64,
        seed: 3,
        ..config()
    };
    let mut world = World::new(config, Box::new(PerlinPager::new(64, 3))).unwrap();
    let cloudy_columns = |world: &World| {
        let mut count = 0;
        for x in 0..256 {
            for z in 0..256 {
                if world.find_floor(x, z, |m| m == VoxelType::Cloud).is_some() {
                    count += 1;
                }
            }
        }
        count
    };
    assert_eq!(cloudy_columns(&world), 0);

    world.set_client_data(true);
    // Resident chunks were generated without clouds; a reset pages them out.
    world.reset();
    world.on_tick();
    assert!(!world.is_reset());
    assert!(cloudy_columns(&world) > 0);
}
