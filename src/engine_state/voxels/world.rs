//! # World Module
//!
//! This module provides the `ChunkManager`, which owns every resident chunk and
//! streams chunks in and out of memory as a viewpoint moves.
//!
//! ## Chunk Lifecycle
//!
//! A chunk coordinate is in one of three states: absent, loading (a request
//! is queued or running on the worker pool) or resident. Requests are issued
//! for every coordinate within `render_distance` (Chebyshev, in chunks) of the
//! viewpoint's chunk, nearest first, clamped to the configured vertical band.
//! Resident chunks are evicted only once they are farther than
//! `unload_distance`; the band between the two distances keeps chunks at the
//! edge of the window from thrashing.
//!
//! Each finished chunk goes through generation, a lighting pass, a single
//! mesh build, and finally registration with the scene, in that order.
//!
//! ## Light Consistency
//!
//! Results are installed in batches: every result that has arrived is made
//! resident first, then one lighting pass covers the new chunks together
//! with every resident chunk whose shadow rays or point-light segments can
//! reach into them. Evictions relight their dependents the same way. After
//! any batch each light buffer equals what `regenerate_lighting` would
//! compute for the current resident set.
//!
//! ## Stale Results
//!
//! Every request gets a `RequestId`. A result is installed only if its id is
//! still the one recorded for that coordinate and the coordinate is still
//! inside the render window; otherwise it is dropped. A failed request clears
//! the loading mark so the next viewpoint update retries it.
//!
//! ## Performance Considerations
//!
//! - Chunk lookup is O(1) using a hash map keyed by chunk coordinates
//! - Terrain generation never runs on the control thread during streaming;
//!   only `force_load` generates synchronously
//! - Lighting and meshing run on the control thread because they read
//!   neighbouring chunks

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use cgmath::{InnerSpace, Point3, Vector3};
use log::{debug, error, info, warn};
use web_time::Instant;

use crate::{
    config::{EngineConfig, WorldGenConfig},
    engine_state::{
        lighting::{BlockSource, LightRegistry, LightSource, LightingEngine, SunState, TimeOfDay},
        rendering::{meshing::MeshStats, NullScene, SceneSink},
        task_management::{
            task::{Completed, RequestId},
            WorkerPool,
        },
    },
    error::EngineError,
};

use super::{
    block::block_type::BlockType,
    chunk::{Chunk, CHUNK_DIMENSION},
    tasks::chunk_generation_task::ChunkGenerationTask,
    terrain::TerrainGenerator,
};

/// Chunk coordinates of the chunk containing a world-space point.
pub fn world_to_chunk(position: Point3<f32>) -> Point3<i32> {
    let dim = CHUNK_DIMENSION as f32;
    Point3::new(
        (position.x / dim).floor() as i32,
        (position.y / dim).floor() as i32,
        (position.z / dim).floor() as i32,
    )
}

/// Chunk-local coordinates of the block containing a world-space point.
pub fn world_to_local(position: Point3<f32>) -> Point3<i32> {
    let (_, local) = block_to_chunk(
        position.x.floor() as i32,
        position.y.floor() as i32,
        position.z.floor() as i32,
    );
    local
}

/// Splits world block coordinates into chunk coordinates and local coordinates.
pub fn block_to_chunk(x: i32, y: i32, z: i32) -> (Point3<i32>, Point3<i32>) {
    (
        Point3::new(
            x.div_euclid(CHUNK_DIMENSION),
            y.div_euclid(CHUNK_DIMENSION),
            z.div_euclid(CHUNK_DIMENSION),
        ),
        Point3::new(
            x.rem_euclid(CHUNK_DIMENSION),
            y.rem_euclid(CHUNK_DIMENSION),
            z.rem_euclid(CHUNK_DIMENSION),
        ),
    )
}

/// Chebyshev (maximum-axis) distance between two chunk coordinates.
pub fn chebyshev_distance(a: Point3<i32>, b: Point3<i32>) -> i32 {
    (a.x - b.x)
        .abs()
        .max((a.y - b.y).abs())
        .max((a.z - b.z).abs())
}

fn squared_distance(a: Point3<i32>, b: Point3<i32>) -> i32 {
    let d = a - b;
    d.x * d.x + d.y * d.y + d.z * d.z
}

/// Where a chunk coordinate is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Neither resident nor requested.
    Absent,
    /// A generation request is outstanding.
    Loading,
    /// Generated, lit and meshed.
    Resident,
}

/// Owns resident chunks, the generation worker pool, lights and the sun.
///
/// All methods run on the single control thread. Workers only ever see
/// `ChunkGenerationTask`s and hand back raw block buffers.
pub struct ChunkManager<S: SceneSink = NullScene> {
    config: EngineConfig,
    chunks: HashMap<Point3<i32>, Chunk>,
    /// Outstanding request per coordinate
    loading: HashMap<Point3<i32>, RequestId>,
    pool: WorkerPool<ChunkGenerationTask>,
    /// Control-thread generator for `force_load`
    generator: TerrainGenerator,
    lighting: LightingEngine,
    lights: LightRegistry,
    time_of_day: TimeOfDay,
    /// Sun direction used by the last full lighting pass
    lit_sun_direction: Vector3<f32>,
    viewpoint_chunk: Option<Point3<i32>>,
    /// Set when a request failed and the window must be re-examined
    needs_dispatch: bool,
    scene: S,
}

impl ChunkManager<NullScene> {
    /// Creates a manager whose meshes go nowhere.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_scene(config, NullScene)
    }
}

impl<S: SceneSink> ChunkManager<S> {
    /// Validates `config`, spawns the worker pool and returns an empty manager.
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] for an invalid configuration, before any
    /// thread is started, or [`EngineError::WorkerSpawn`] if a worker thread
    /// cannot be created.
    pub fn with_scene(config: EngineConfig, scene: S) -> Result<Self, EngineError> {
        config.validate()?;

        let world = config.world;
        let worker_count = config.resolved_worker_count();
        let pool = WorkerPool::new(worker_count, move |_| Some(TerrainGenerator::new(world)))?;
        let time_of_day = TimeOfDay::new(config.start_hour, config.day_length_seconds);

        info!(
            "Chunk manager ready: seed {}, render distance {}, unload distance {}, {} workers",
            world.seed, config.render_distance, config.unload_distance, worker_count
        );

        Ok(ChunkManager {
            generator: TerrainGenerator::new(world),
            lighting: LightingEngine::new(config.lighting),
            lights: LightRegistry::new(),
            lit_sun_direction: time_of_day.sun_direction(),
            time_of_day,
            chunks: HashMap::new(),
            loading: HashMap::new(),
            pool,
            viewpoint_chunk: None,
            needs_dispatch: false,
            scene,
            config,
        })
    }

    /// The validated configuration, including any world config changes.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the terrain parameters. Resident chunks are kept as they are;
    /// only chunks requested from now on use the new values.
    pub fn set_world_config(&mut self, world: WorldGenConfig) {
        self.config.world = world;
        self.generator = TerrainGenerator::new(world);
    }

    /// Number of resident chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of coordinates with an outstanding generation request.
    pub fn loading_count(&self) -> usize {
        self.loading.len()
    }

    /// The resident chunk at `position`.
    pub fn chunk(&self, position: Point3<i32>) -> Option<&Chunk> {
        self.chunks.get(&position)
    }

    /// Where `position` is in its lifecycle.
    pub fn chunk_state(&self, position: Point3<i32>) -> ChunkState {
        if self.chunks.contains_key(&position) {
            ChunkState::Resident
        } else if self.loading.contains_key(&position) {
            ChunkState::Loading
        } else {
            ChunkState::Absent
        }
    }

    /// Coordinates of every resident chunk, in no particular order.
    pub fn resident_positions(&self) -> impl Iterator<Item = Point3<i32>> + '_ {
        self.chunks.keys().copied()
    }

    /// Chunk containing the last viewpoint passed to `update_viewpoint`.
    pub fn viewpoint_chunk(&self) -> Option<Point3<i32>> {
        self.viewpoint_chunk
    }

    /// The scene receiving chunk meshes.
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable access to the scene.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// The lighting engine.
    pub fn lighting(&self) -> &LightingEngine {
        &self.lighting
    }

    /// The day clock.
    pub fn time_of_day(&self) -> &TimeOfDay {
        &self.time_of_day
    }

    /// The sun at the current time of day.
    pub fn sun(&self) -> SunState {
        self.time_of_day.sun()
    }

    /// Summed statistics of every resident chunk's mesh.
    pub fn mesh_stats(&self) -> MeshStats {
        self.chunks
            .values()
            .filter_map(Chunk::mesh)
            .fold(MeshStats::default(), |total, mesh| total + mesh.stats())
    }

    /// Block at a world-space point; air if its chunk is not resident.
    pub fn block_at_position(&self, position: Point3<f32>) -> BlockType {
        self.block_at(
            position.x.floor() as i32,
            position.y.floor() as i32,
            position.z.floor() as i32,
        )
    }

    /// Reacts to the viewpoint moving.
    ///
    /// Does nothing while the viewpoint stays in the same chunk, unless an
    /// earlier request failed. Otherwise evicts chunks beyond the unload
    /// distance, drops queued requests that left the render window and
    /// requests every missing chunk inside it, nearest first.
    ///
    /// # Returns
    /// Whether the window was re-examined.
    pub fn update_viewpoint(&mut self, viewpoint: Point3<f32>) -> bool {
        let center = world_to_chunk(viewpoint);
        let moved = self.viewpoint_chunk != Some(center);
        if !moved && !self.needs_dispatch {
            return false;
        }

        self.viewpoint_chunk = Some(center);
        self.needs_dispatch = false;
        if moved {
            let evicted = self.unload_distant(center);
            self.finish_batch(&[], &evicted);
            self.prune_queued(center);
        }
        self.dispatch_missing(center);
        true
    }

    /// Evicts every resident chunk farther than the unload distance from `center`.
    ///
    /// # Returns
    /// The evicted positions.
    fn unload_distant(&mut self, center: Point3<i32>) -> Vec<Point3<i32>> {
        let unload_distance = self.config.unload_distance;
        let distant: Vec<Point3<i32>> = self
            .chunks
            .keys()
            .filter(|&&position| chebyshev_distance(position, center) > unload_distance)
            .copied()
            .collect();

        for position in &distant {
            if let Some(mut chunk) = self.chunks.remove(position) {
                self.scene.remove_chunk_mesh(*position);
                chunk.dispose();
            }
        }
        if !distant.is_empty() {
            debug!("Unloaded {} chunks around {:?}", distant.len(), center);
        }
        distant
    }

    /// Removes queued requests that are no longer inside the render window.
    fn prune_queued(&mut self, center: Point3<i32>) {
        let render_distance = self.config.render_distance;
        let pruned = self
            .pool
            .retain_queued(|task| chebyshev_distance(task.position, center) <= render_distance);
        for envelope in pruned {
            let position = envelope.task.position;
            if self.loading.get(&position) == Some(&envelope.request_id) {
                self.loading.remove(&position);
            }
        }
    }

    /// Requests every chunk of the window around `center` that is neither
    /// resident nor loading.
    fn dispatch_missing(&mut self, center: Point3<i32>) {
        let r = self.config.render_distance;
        let min_y = (center.y - r).max(self.config.min_chunk_y);
        let max_y = (center.y + r).min(self.config.max_chunk_y);

        let mut candidates = Vec::new();
        for x in center.x - r..=center.x + r {
            for y in min_y..=max_y {
                for z in center.z - r..=center.z + r {
                    let position = Point3::new(x, y, z);
                    let requested = self.loading.contains_key(&position);
                    if !requested && !self.chunks.contains_key(&position) {
                        candidates.push(position);
                    }
                }
            }
        }
        candidates.sort_by_key(|&position| {
            (
                chebyshev_distance(position, center),
                squared_distance(position, center),
                position.y,
                position.x,
                position.z,
            )
        });

        for &position in &candidates {
            let request_id = self
                .pool
                .publish(ChunkGenerationTask::new(position, self.config.world));
            self.loading.insert(position, request_id);
        }
        if !candidates.is_empty() {
            debug!("Requested {} chunks around {:?}", candidates.len(), center);
        }
    }

    /// Installs every generation result that has arrived and hands queued
    /// requests to free workers.
    ///
    /// # Returns
    /// Number of chunks that became resident.
    pub fn process_completed(&mut self) -> usize {
        let installed: Vec<Point3<i32>> = self
            .pool
            .poll_completed()
            .into_iter()
            .filter_map(|completed| self.apply_completed(completed))
            .collect();
        self.finish_batch(&installed, &[]);
        self.pool.process_queued_tasks();
        installed.len()
    }

    /// One frame's worth of streaming: viewpoint update then result processing.
    pub fn tick(&mut self, viewpoint: Point3<f32>) -> usize {
        self.update_viewpoint(viewpoint);
        self.process_completed()
    }

    /// Updates the viewpoint and blocks until every request it caused has
    /// completed or `timeout` has passed.
    ///
    /// # Returns
    /// Number of chunks that became resident.
    pub fn load_around_blocking(&mut self, viewpoint: Point3<f32>, timeout: Duration) -> usize {
        let start = Instant::now();
        let deadline = start + timeout;
        self.update_viewpoint(viewpoint);

        let mut installed = Vec::new();
        while !self.loading.is_empty() {
            if self.pool.is_idle() {
                warn!(
                    "{} chunks marked loading with no work outstanding",
                    self.loading.len()
                );
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                warn!(
                    "Timed out after {:?} with {} chunks still loading",
                    timeout,
                    self.loading.len()
                );
                break;
            }
            for completed in self.pool.wait_completed(deadline - now) {
                installed.extend(self.apply_completed(completed));
            }
            self.pool.process_queued_tasks();
        }

        self.finish_batch(&installed, &[]);
        debug!("Loaded {} chunks in {:?}", installed.len(), start.elapsed());
        installed.len()
    }

    /// Makes one generation result resident if it is still wanted. The chunk
    /// stays unlit and unregistered until `finish_batch`.
    ///
    /// # Returns
    /// The position of the chunk that became resident.
    fn apply_completed(
        &mut self,
        completed: Completed<ChunkGenerationTask>,
    ) -> Option<Point3<i32>> {
        let Completed {
            request_id,
            task,
            outcome,
            ..
        } = completed;
        let position = task.position;

        match self.loading.get(&position) {
            Some(&current) if current == request_id => {
                self.loading.remove(&position);
            }
            _ => {
                debug!("Discarding stale result {} for chunk {:?}", request_id, position);
                return None;
            }
        }

        let blocks = match outcome {
            Ok(blocks) => blocks,
            Err(err) => {
                error!(
                    "Generation of chunk {:?} failed ({}): {}",
                    position, request_id, err
                );
                self.needs_dispatch = true;
                return None;
            }
        };

        if self.chunks.contains_key(&position) {
            return None;
        }
        if let Some(center) = self.viewpoint_chunk {
            if chebyshev_distance(position, center) > self.config.render_distance {
                debug!("Chunk {:?} left the render window before it finished", position);
                return None;
            }
        }

        match Chunk::from_raw(position, blocks) {
            Ok(chunk) => {
                self.chunks.insert(position, chunk);
                Some(position)
            }
            Err(err) => {
                error!("Worker returned a bad buffer for chunk {:?}: {}", position, err);
                self.needs_dispatch = true;
                None
            }
        }
    }

    /// Resident chunks other than `position` whose light can depend on the
    /// blocks of the chunk at `position`.
    ///
    /// A sample is shadowed by blocks up to `shadow_max_distance` towards the
    /// sun, so the chunk's box swept away from the sun bounds the affected
    /// samples. A point light only reaches samples closer than its intensity,
    /// so every light whose sphere touches the chunk makes its whole sphere
    /// affected.
    fn light_dependents(&self, position: Point3<i32>, sun: &SunState) -> Vec<Point3<i32>> {
        let size = CHUNK_DIMENSION as f32;
        let lo = Point3::new(position.x as f32, position.y as f32, position.z as f32) * size;
        let hi = lo + Vector3::new(size, size, size);

        let mut boxes = Vec::new();
        let lighting = self.lighting.config();
        if lighting.shadows_enabled && !self.lighting.is_night(sun) {
            let reach = sun.direction * -lighting.shadow_max_distance;
            let (swept_lo, swept_hi) = (lo + reach, hi + reach);
            boxes.push((
                Point3::new(lo.x.min(swept_lo.x), lo.y.min(swept_lo.y), lo.z.min(swept_lo.z)),
                Point3::new(hi.x.max(swept_hi.x), hi.y.max(swept_hi.y), hi.z.max(swept_hi.z)),
            ));
        }
        for light in self.lights.iter() {
            let radius = light.intensity as f32;
            let extent = Vector3::new(radius, radius, radius);
            let (light_lo, light_hi) = (light.position - extent, light.position + extent);
            let touches = light_lo.x <= hi.x
                && light_hi.x >= lo.x
                && light_lo.y <= hi.y
                && light_hi.y >= lo.y
                && light_lo.z <= hi.z
                && light_hi.z >= lo.z;
            if touches {
                boxes.push((light_lo, light_hi));
            }
        }

        let mut dependents = Vec::new();
        for (box_lo, box_hi) in boxes {
            let (min, max) = (world_to_chunk(box_lo), world_to_chunk(box_hi));
            for x in min.x..=max.x {
                for y in min.y..=max.y {
                    for z in min.z..=max.z {
                        let candidate = Point3::new(x, y, z);
                        if candidate != position && self.chunks.contains_key(&candidate) {
                            dependents.push(candidate);
                        }
                    }
                }
            }
        }
        dependents
    }

    /// Lights, meshes and registers the chunks in `installed`, then relights
    /// every other resident chunk whose light depends on `installed` or
    /// `evicted`. Relit chunks whose buffer did not change keep their mesh.
    fn finish_batch(&mut self, installed: &[Point3<i32>], evicted: &[Point3<i32>]) {
        if installed.is_empty() && evicted.is_empty() {
            return;
        }
        let sun = self.time_of_day.sun();
        let fresh: HashSet<Point3<i32>> = installed.iter().copied().collect();
        let mut targets = fresh.clone();
        for &position in installed.iter().chain(evicted) {
            targets.extend(self.light_dependents(position, &sun));
        }

        let buffers: Vec<(Point3<i32>, Vec<u8>)> = targets
            .iter()
            .filter_map(|position| self.chunks.get(position))
            .map(|chunk| {
                let light = self
                    .lighting
                    .compute_chunk_light(chunk.origin(), &sun, &self.lights, &*self);
                (chunk.position, light)
            })
            .collect();

        let strategy = self.config.meshing;
        let mut relit = 0;
        for (position, light) in buffers {
            let is_fresh = fresh.contains(&position);
            let Some(chunk) = self.chunks.get_mut(&position) else {
                continue;
            };
            if !is_fresh && chunk.light_buffer() == light.as_slice() {
                continue;
            }
            chunk.set_light_buffer(light);
            let mesh = chunk.build_mesh(Some(&self.lighting), strategy);
            if is_fresh {
                self.scene.add_chunk_mesh(position, mesh);
            } else {
                self.scene.update_chunk_mesh(position, mesh);
                relit += 1;
            }
        }
        if relit > 0 {
            debug!("Relit {} neighbouring chunks", relit);
        }
    }

    /// Generates, lights and meshes the chunk at `position` on the calling
    /// thread if it is not resident, and returns it.
    ///
    /// An outstanding worker request for the same coordinate becomes stale.
    pub fn force_load(&mut self, position: Point3<i32>) -> &Chunk {
        if !self.chunks.contains_key(&position) {
            if let Some(request_id) = self.loading.remove(&position) {
                debug!("Force-loading chunk {:?} over request {}", position, request_id);
            }
            let start = Instant::now();
            let chunk = self.generator.generate(position);
            self.chunks.insert(position, chunk);
            self.finish_batch(&[position], &[]);
            debug!("Force-loaded chunk {:?} in {:?}", position, start.elapsed());
        }
        &self.chunks[&position]
    }

    /// Recomputes the light buffer and rebuilds the mesh of every resident chunk.
    pub fn regenerate_lighting(&mut self) {
        let start = Instant::now();
        let sun = self.time_of_day.sun();

        let buffers: Vec<(Point3<i32>, Vec<u8>)> = self
            .chunks
            .values()
            .map(|chunk| {
                let light = self
                    .lighting
                    .compute_chunk_light(chunk.origin(), &sun, &self.lights, &*self);
                (chunk.position, light)
            })
            .collect();

        let strategy = self.config.meshing;
        for (position, light) in buffers {
            if let Some(chunk) = self.chunks.get_mut(&position) {
                chunk.set_light_buffer(light);
                let mesh = chunk.build_mesh(Some(&self.lighting), strategy);
                self.scene.update_chunk_mesh(position, mesh);
            }
        }
        self.lit_sun_direction = sun.direction;

        info!(
            "Regenerated lighting for {} chunks in {:?}",
            self.chunks.len(),
            start.elapsed()
        );
    }

    /// Advances the day cycle by `delta_seconds` of real time.
    ///
    /// # Returns
    /// Whether the sun moved far enough since the last lighting pass to
    /// trigger a full relight.
    pub fn advance_time(&mut self, delta_seconds: f32) -> bool {
        self.time_of_day.advance(delta_seconds);
        let direction = self.time_of_day.sun_direction();
        let angle = direction.dot(self.lit_sun_direction).clamp(-1.0, 1.0).acos();
        if angle > self.config.relight_angle_threshold {
            self.regenerate_lighting();
            true
        } else {
            false
        }
    }

    /// Jumps the clock to `hours` and relights every resident chunk.
    pub fn set_time_of_day(&mut self, hours: f32) {
        self.time_of_day.set_time(hours);
        self.regenerate_lighting();
    }

    /// Adds or replaces a point light. Call `regenerate_lighting` to apply it.
    pub fn add_light(&mut self, source: LightSource) -> Option<LightSource> {
        self.lights.insert(source)
    }

    /// Removes a point light by id. Call `regenerate_lighting` to apply it.
    pub fn remove_light(&mut self, id: &str) -> Option<LightSource> {
        self.lights.remove(id)
    }

    /// The point light registered under `id`.
    pub fn light(&self, id: &str) -> Option<&LightSource> {
        self.lights.get(id)
    }

    /// Every registered point light.
    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }
}

/// World block lookup across resident chunks; unloaded chunks read as air.
impl<S: SceneSink> BlockSource for ChunkManager<S> {
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        let (chunk_position, local) = block_to_chunk(x, y, z);
        self.chunks
            .get(&chunk_position)
            .map_or(BlockType::AIR, |chunk| chunk.get(local.x, local.y, local.z))
    }
}
