use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
    tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future},
};

use crate::{
    config::TerrainConfig,
    error::Result,
    noise::PerlinField,
    pack::pack,
    terrain::build_mesh,
};

/// System sets for the terrain pipeline.
///
/// Use these to order your own systems relative to terrain generation:
///
/// ```rust,ignore
/// // Build colliders from the raw buffers before they become a render mesh:
/// app.add_systems(Update, build_collider.after(TerrainSet::Generate)
///                                       .before(TerrainSet::Upload));
/// ```
///
/// ```text
/// TerrainSet::Spawn   →  [async compute]  →  TerrainSet::Generate  →  [your systems]  →  TerrainSet::Upload
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TerrainSet {
    /// Spawns an async compute task for each queued request.
    Spawn,
    /// Polls async tasks and inserts [`GeneratedTerrain`] on completion.
    Generate,
    /// Uploads [`GeneratedTerrain`] into a Bevy [`Mesh3d`].
    Upload,
}

/// Asks the plugin to generate a terrain mesh on this entity.
///
/// Arguments mirror [`generate_terrain`](crate::terrain::generate_terrain).
#[derive(Component, Debug, Clone, Copy, PartialEq)]
#[require(Transform)]
pub struct TerrainRequest {
    /// World extent along X and Z.
    pub size: f32,
    /// `2^level_count` chunks per side.
    pub level_count: i32,
    /// Cubes per chunk axis.
    pub max_segment: i32,
}

impl Default for TerrainRequest {
    fn default() -> Self {
        Self {
            size: 256.,
            level_count: 2,
            max_segment: 32,
        }
    }
}

/// Marker component added to [`TerrainRequest`] entities that are waiting to be processed.
///
/// Removed once the mesh has been uploaded, or when generation fails.
#[derive(Component)]
pub struct QueuedTerrain;

/// Holds the in-flight async compute task for a [`TerrainRequest`].
#[derive(Component)]
pub struct ComputeTask(Task<Result<GeneratedTerrain>>);

/// Packed terrain buffers plus smooth normals, ready for upload.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct GeneratedTerrain {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl GeneratedTerrain {
    /// Runs the whole generator for `request` with `config`.
    pub fn generate(request: &TerrainRequest, config: &TerrainConfig) -> Result<Self> {
        let noise = PerlinField::new(config.seed);
        let mesh = build_mesh(
            request.size,
            request.level_count,
            request.max_segment,
            config,
            &noise,
        )?;
        let normals = mesh.vertex_normals();
        let block = pack(&mesh.vertices, &mesh.indices)?;

        Ok(Self {
            positions: block.positions().collect(),
            normals,
            indices: block.indices,
        })
    }

    /// Builds a triangle-list [`Mesh`] from the buffers.
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD,
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone());
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals.clone());
        mesh.insert_indices(Indices::U32(self.indices.clone()));
        mesh
    }
}

/// Runtime configuration for the terrain pipeline.
///
/// ```rust,ignore
/// fn reseed(mut config: ResMut<TerrainPluginConfig>) {
///     config.terrain.seed += 1; // applies to requests spawned from now on
/// }
/// ```
#[derive(Resource, Debug, Clone)]
pub struct TerrainPluginConfig {
    /// Maximum number of async generation tasks spawned per frame. Default: `1`.
    pub max_tasks_per_frame: usize,
    /// Density tuning, seed and parallelism used for every request.
    pub terrain: TerrainConfig,
}

impl Default for TerrainPluginConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_frame: 1,
            terrain: TerrainConfig::default(),
        }
    }
}

/// Bevy plugin that turns [`TerrainRequest`]s into meshes.
///
/// With the `auto_queue` feature, every added [`TerrainRequest`] is processed on
/// Bevy's `AsyncComputeTaskPool` so the main thread is never blocked:
///
/// ```text
/// TerrainRequest added
///   → QueuedTerrain inserted          (on_request_add)
///   → ComputeTask spawned             (TerrainSet::Spawn)
///   → [async compute runs]
///   → GeneratedTerrain inserted       (TerrainSet::Generate, once task completes)
///   → Mesh3d inserted                 (TerrainSet::Upload)
///   → QueuedTerrain removed
/// ```
#[derive(Default)]
pub struct TerrainPlugin {
    /// Initial value for [`TerrainPluginConfig`].
    pub config: TerrainPluginConfig,
}

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone());

        #[cfg(feature = "auto_queue")]
        app.configure_sets(
            Update,
            (TerrainSet::Spawn, TerrainSet::Generate, TerrainSet::Upload).chain(),
        )
        .add_systems(
            Update,
            (
                on_request_add,
                spawn_terrain_tasks.in_set(TerrainSet::Spawn),
                poll_terrain_tasks.in_set(TerrainSet::Generate),
                upload_terrain.in_set(TerrainSet::Upload),
            ),
        );
    }
}

/// Inserts [`QueuedTerrain`] on every newly added [`TerrainRequest`].
fn on_request_add(
    mut commands: Commands,
    query: Query<Entity, (Added<TerrainRequest>, Without<QueuedTerrain>)>,
) {
    for entity in query.iter() {
        commands.entity(entity).insert(QueuedTerrain);
    }
}

/// Spawns async compute tasks for queued requests, up to
/// [`TerrainPluginConfig::max_tasks_per_frame`] per frame.
fn spawn_terrain_tasks(
    mut commands: Commands,
    config: Res<TerrainPluginConfig>,
    query: Query<
        (Entity, &TerrainRequest),
        (
            With<QueuedTerrain>,
            Without<ComputeTask>,
            Without<GeneratedTerrain>,
        ),
    >,
) {
    let task_pool = AsyncComputeTaskPool::get();

    for (entity, request) in query.iter().take(config.max_tasks_per_frame) {
        let request = *request;
        let terrain = config.terrain;
        let task = task_pool.spawn(async move { GeneratedTerrain::generate(&request, &terrain) });
        commands.entity(entity).insert(ComputeTask(task));
    }
}

/// Polls in-flight [`ComputeTask`]s and inserts [`GeneratedTerrain`] on completion.
///
/// Failed requests are logged and dequeued.
fn poll_terrain_tasks(mut commands: Commands, mut query: Query<(Entity, &mut ComputeTask)>) {
    for (entity, mut compute_task) in query.iter_mut() {
        let Some(outcome) = block_on(future::poll_once(&mut compute_task.0)) else {
            continue;
        };
        let mut entity_commands = commands.entity(entity);
        entity_commands.remove::<ComputeTask>();
        match outcome {
            Ok(generated) => {
                debug!(
                    vertices = generated.positions.len(),
                    indices = generated.indices.len(),
                    "terrain ready for upload"
                );
                entity_commands.insert(generated);
            }
            Err(err) => {
                warn!("terrain request on {entity} failed: {err}");
                entity_commands.remove::<QueuedTerrain>();
            }
        }
    }
}

/// Uploads [`GeneratedTerrain`] into a [`Mesh3d`], then removes it and [`QueuedTerrain`].
fn upload_terrain(
    mut commands: Commands,
    query: Query<(Entity, &GeneratedTerrain), With<QueuedTerrain>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for (entity, generated) in query.iter() {
        commands
            .entity(entity)
            .insert(Mesh3d(meshes.add(generated.to_mesh())))
            .remove::<(GeneratedTerrain, QueuedTerrain)>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_buffers_line_up() {
        let request = TerrainRequest {
            size: 64.,
            level_count: 1,
            max_segment: 8,
        };
        let generated = GeneratedTerrain::generate(&request, &TerrainConfig::default()).unwrap();

        assert_eq!(generated.positions.len(), generated.normals.len());
        assert_eq!(generated.indices.len() % 3, 0);
        assert!(
            generated
                .indices
                .iter()
                .all(|&i| (i as usize) < generated.positions.len())
        );
    }

    #[test]
    fn mesh_carries_every_buffer() {
        let generated = GeneratedTerrain {
            positions: vec![[0., 0., 0.], [1., 0., 0.], [0., 0., 1.]],
            normals: vec![[0., 1., 0.]; 3],
            indices: vec![0, 2, 1],
        };
        let mesh = generated.to_mesh();

        assert_eq!(mesh.count_vertices(), 3);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(3));
    }

    #[test]
    fn invalid_request_is_reported() {
        let request = TerrainRequest {
            max_segment: 0,
            ..Default::default()
        };
        assert!(GeneratedTerrain::generate(&request, &TerrainConfig::default()).is_err());
    }
}
