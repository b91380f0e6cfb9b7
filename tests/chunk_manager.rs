use std::{collections::HashMap, thread, time::Duration};

use cgmath::Point3;
use voxel_world::{
    engine_state::voxels::{
        terrain::TerrainGenerator,
        world::{chebyshev_distance, ChunkState},
    },
    BlockSource, BlockType, ChunkManager, DrawList, EngineConfig, LightSource,
};

const TIMEOUT: Duration = Duration::from_secs(60);

fn flat_band_config() -> EngineConfig {
    EngineConfig {
        render_distance: 1,
        unload_distance: 2,
        worker_count: 2,
        min_chunk_y: 0,
        max_chunk_y: 0,
        ..Default::default()
    }
}

fn chunk_center(x: i32, y: i32, z: i32) -> Point3<f32> {
    Point3::new(x as f32 * 16.0 + 8.0, y as f32 * 16.0 + 8.0, z as f32 * 16.0 + 8.0)
}

fn manager_with_draw_list(config: EngineConfig) -> ChunkManager<DrawList> {
    ChunkManager::with_scene(config, DrawList::new()).unwrap()
}

#[test]
fn loads_the_full_render_window() {
    let mut manager = manager_with_draw_list(flat_band_config());
    let installed = manager.load_around_blocking(chunk_center(0, 0, 0), TIMEOUT);

    assert_eq!(installed, 9);
    assert_eq!(manager.chunk_count(), 9);
    assert_eq!(manager.loading_count(), 0);
    for x in -1..=1 {
        for z in -1..=1 {
            assert_eq!(manager.chunk_state(Point3::new(x, 0, z)), ChunkState::Resident);
        }
    }
}

#[test]
fn chunks_in_the_hysteresis_band_stay_resident() {
    let mut manager = manager_with_draw_list(flat_band_config());
    manager.load_around_blocking(chunk_center(0, 0, 0), TIMEOUT);

    // Two chunks east: (0, 0, 0) sits at distance 2 == U, (-1, 0, 0) at 3 > U.
    manager.load_around_blocking(chunk_center(2, 0, 0), TIMEOUT);
    assert_eq!(manager.chunk_state(Point3::new(0, 0, 0)), ChunkState::Resident);
    assert_eq!(manager.chunk_state(Point3::new(0, 0, 1)), ChunkState::Resident);
    assert_eq!(manager.chunk_state(Point3::new(-1, 0, 0)), ChunkState::Absent);
    assert_eq!(manager.chunk_state(Point3::new(-1, 0, -1)), ChunkState::Absent);

    // Stepping back one chunk does not thrash: nothing is evicted, nothing reloaded.
    let before = manager.chunk_count();
    manager.update_viewpoint(chunk_center(1, 0, 0));
    assert_eq!(manager.loading_count(), 0);
    assert_eq!(manager.chunk_count(), before);
}

#[test]
fn no_resident_chunk_is_beyond_the_unload_distance() {
    let mut manager = manager_with_draw_list(flat_band_config());
    for x in 0..6 {
        manager.load_around_blocking(chunk_center(x, 0, x / 2), TIMEOUT);
        let center = manager.viewpoint_chunk().unwrap();
        assert!(manager
            .resident_positions()
            .all(|position| chebyshev_distance(position, center) <= 2));
    }
}

#[test]
fn unloaded_blocks_read_as_air() {
    let mut manager = manager_with_draw_list(flat_band_config());
    assert_eq!(manager.block_at(0, 0, 0), BlockType::AIR);

    manager.load_around_blocking(chunk_center(0, 0, 0), TIMEOUT);
    assert_eq!(manager.block_at(0, 0, 0), BlockType::BEDROCK);
    assert_eq!(manager.block_at(1000, 5, -1000), BlockType::AIR);
    assert_eq!(manager.block_at(0, -1, 0), BlockType::AIR);
}

#[test]
fn worker_chunks_match_synchronous_generation() {
    let config = flat_band_config();
    let mut generator = TerrainGenerator::new(config.world);
    let mut manager = manager_with_draw_list(config);
    manager.load_around_blocking(chunk_center(0, 0, 0), TIMEOUT);

    for position in manager.resident_positions().collect::<Vec<_>>() {
        let chunk = manager.chunk(position).unwrap();
        assert_eq!(chunk.blocks(), generator.generate_blocks(position).as_slice());
    }
}

#[test]
fn seed_12345_origin_chunk_has_terrain_and_a_mesh() {
    let mut manager = manager_with_draw_list(flat_band_config());
    assert_eq!(manager.config().world.seed, 12345);
    manager.load_around_blocking(chunk_center(0, 0, 0), TIMEOUT);

    let origin = Point3::new(0, 0, 0);
    let chunk = manager.chunk(origin).unwrap();
    let surface = chunk.count_blocks(BlockType::GRASS) + chunk.count_blocks(BlockType::SAND);
    assert!(surface > 0);
    assert_eq!(chunk.count_blocks(BlockType::BEDROCK), 256);
    assert!(chunk
        .iter_blocks()
        .filter(|&(_, block_type)| block_type == BlockType::WATER)
        .all(|(position, _)| position.y <= 5));

    let stats = manager.scene().get(origin).copied().unwrap();
    assert!(stats.faces > 0);
    assert_eq!(stats.vertices, stats.faces * 4);
    assert_eq!(stats.indices, stats.faces * 6);
}

#[test]
fn scene_tracks_loads_and_evictions() {
    let mut manager = manager_with_draw_list(flat_band_config());
    manager.load_around_blocking(chunk_center(0, 0, 0), TIMEOUT);
    assert_eq!(manager.scene().len(), 9);
    assert_eq!(manager.scene().uploads(), 9);

    manager.load_around_blocking(chunk_center(3, 0, 0), TIMEOUT);
    assert_eq!(manager.scene().len(), manager.chunk_count());
    assert!(!manager.scene().contains(Point3::new(0, 0, 0)));
    assert!(manager.scene().contains(Point3::new(3, 0, 0)));
    assert_eq!(manager.scene().totals(), manager.mesh_stats());
}

#[test]
fn midnight_lights_every_block_at_the_night_floor() {
    let mut manager = manager_with_draw_list(flat_band_config());
    manager.load_around_blocking(chunk_center(0, 0, 0), TIMEOUT);
    manager.set_time_of_day(0.0);

    let floor = manager.config().lighting.night_floor;
    for position in manager.resident_positions().collect::<Vec<_>>() {
        let chunk = manager.chunk(position).unwrap();
        assert!(chunk.light_buffer().iter().all(|&level| level == floor));
    }
}

#[test]
fn open_sky_at_noon_receives_full_sun() {
    let config = EngineConfig {
        max_chunk_y: 1,
        ..flat_band_config()
    };
    let mut manager = manager_with_draw_list(config);
    manager.load_around_blocking(chunk_center(0, 1, 0), TIMEOUT);
    manager.set_time_of_day(12.0);

    let chunk = manager.chunk(Point3::new(0, 1, 0)).unwrap();
    assert_eq!(chunk.light_at(8, 15, 8), 15);
}

#[test]
fn regenerate_lighting_applies_point_lights() {
    let config = EngineConfig {
        max_chunk_y: 1,
        ..flat_band_config()
    };
    let mut manager = manager_with_draw_list(config);
    manager.load_around_blocking(chunk_center(0, 1, 0), TIMEOUT);
    manager.set_time_of_day(0.0);
    let uploads = manager.scene().uploads();

    let upper = Point3::new(0, 1, 0);
    assert_eq!(manager.chunk(upper).unwrap().light_at(8, 12, 8), 4);

    manager.add_light(LightSource::point("lamp", Point3::new(8.5, 28.5, 8.5), 15));
    // Not applied until the next lighting pass.
    assert_eq!(manager.chunk(upper).unwrap().light_at(8, 12, 8), 4);

    manager.regenerate_lighting();
    let chunk = manager.chunk(upper).unwrap();
    assert_eq!(chunk.light_at(8, 12, 8), 15);
    assert_eq!(chunk.light_at(8, 12, 11), 12);
    assert!(manager.scene().uploads() > uploads);

    manager.remove_light("lamp");
    manager.regenerate_lighting();
    assert_eq!(manager.chunk(upper).unwrap().light_at(8, 12, 8), 4);
}

#[test]
fn results_for_abandoned_positions_are_discarded() {
    let mut manager = manager_with_draw_list(flat_band_config());
    manager.update_viewpoint(chunk_center(0, 0, 0));
    assert_eq!(manager.loading_count(), 9);

    // Jump far away before anything completes.
    manager.load_around_blocking(chunk_center(20, 0, 20), TIMEOUT);
    let center = Point3::new(20, 0, 20);
    assert_eq!(manager.chunk_count(), 9);
    assert!(manager
        .resident_positions()
        .all(|position| chebyshev_distance(position, center) <= 1));
    assert_eq!(manager.chunk_state(Point3::new(0, 0, 0)), ChunkState::Absent);
}

#[test]
fn changed_world_config_only_affects_new_chunks() {
    let mut manager = manager_with_draw_list(flat_band_config());
    manager.load_around_blocking(chunk_center(0, 0, 0), TIMEOUT);
    let origin = Point3::new(0, 0, 0);
    let before = manager.chunk(origin).unwrap().blocks().to_vec();

    let mut world = manager.config().world;
    world.seed = 999;
    manager.set_world_config(world);
    assert_eq!(manager.chunk(origin).unwrap().blocks(), before.as_slice());

    manager.load_around_blocking(chunk_center(5, 0, 0), TIMEOUT);
    let mut generator = TerrainGenerator::new(world);
    let fresh = Point3::new(5, 0, 0);
    assert_eq!(
        manager.chunk(fresh).unwrap().blocks(),
        generator.generate_blocks(fresh).as_slice()
    );
}

fn hilly_config() -> EngineConfig {
    let mut config = EngineConfig {
        max_chunk_y: 2,
        start_hour: 12.0,
        ..flat_band_config()
    };
    config.world.sea_level = 16.0;
    config.world.terrain_height = 20.0;
    config
}

fn light_snapshot(manager: &ChunkManager<DrawList>) -> HashMap<Point3<i32>, Vec<u8>> {
    manager
        .resident_positions()
        .filter_map(|position| manager.chunk(position))
        .map(|chunk| (chunk.position, chunk.light_buffer().to_vec()))
        .collect()
}

fn assert_light_matches_full_relight(manager: &mut ChunkManager<DrawList>) {
    let before = light_snapshot(manager);
    manager.regenerate_lighting();
    let after = light_snapshot(manager);
    assert_eq!(before.len(), after.len());
    for (position, light) in &after {
        let changed = light
            .iter()
            .zip(&before[position])
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 0, "chunk {position:?} was lit against a partial world");
    }
}

#[test]
fn batch_load_light_matches_a_full_relight() {
    let mut manager = manager_with_draw_list(hilly_config());
    manager.load_around_blocking(chunk_center(0, 1, 0), TIMEOUT);
    assert_eq!(manager.chunk_count(), 27);
    assert_light_matches_full_relight(&mut manager);
}

#[test]
fn streamed_light_matches_a_full_relight() {
    let mut manager = manager_with_draw_list(hilly_config());
    for (x, z) in [(0, 0), (1, 0), (2, 1), (4, 1)] {
        let viewpoint = chunk_center(x, 1, z);
        manager.update_viewpoint(viewpoint);
        let deadline = std::time::Instant::now() + TIMEOUT;
        while manager.loading_count() > 0 && std::time::Instant::now() < deadline {
            manager.tick(viewpoint);
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(manager.loading_count(), 0);
        assert_light_matches_full_relight(&mut manager);
    }
}
