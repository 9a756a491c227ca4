use bevy::prelude::*;
use bevy_infinite_grid::{InfiniteGridBundle, InfiniteGridPlugin, InfiniteGridSettings};
use bevy_marching_terrain::{
    TerrainPlugin, TerrainRequest, grid::ChunkGrid, plugin::TerrainPluginConfig,
};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

const TERRAIN: TerrainRequest = TerrainRequest {
    size: 256.,
    level_count: 2,
    max_segment: 24,
};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            TerrainPlugin::default(),
            PanOrbitCameraPlugin,
            InfiniteGridPlugin,
            #[cfg(not(target_arch = "wasm32"))]
            bevy::pbr::wireframe::WireframePlugin::default(),
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, (reseed, debug))
        .run();
}

fn setup(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn(InfiniteGridBundle {
        settings: InfiniteGridSettings {
            fadeout_distance: 1000.0,
            ..Default::default()
        },
        ..Default::default()
    });

    commands.spawn((
        Camera3d::default(),
        PanOrbitCamera {
            button_orbit: MouseButton::Right,
            button_pan: MouseButton::Middle,
            ..default()
        },
        Transform::from_xyz(200., 180., 200.).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::FULL_DAYLIGHT,
            ..Default::default()
        },
        Transform::default().with_rotation(Quat::from_rotation_x(-45.0_f32.to_radians())),
    ));

    commands.spawn((
        TERRAIN,
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.45, 0.55, 0.3),
            // Surface is shaded from both sides.
            cull_mode: None,
            double_sided: true,
            ..Default::default()
        })),
    ));
}

/// Press `R` to regenerate the terrain with the next seed.
fn reseed(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    mut config: ResMut<TerrainPluginConfig>,
    terrain: Query<Entity, With<TerrainRequest>>,
) {
    if !keys.just_pressed(KeyCode::KeyR) {
        return;
    }
    config.terrain.seed = config.terrain.seed.wrapping_add(1);
    info!("regenerating terrain with seed {}", config.terrain.seed);

    for entity in terrain.iter() {
        commands.entity(entity).remove::<(TerrainRequest, Mesh3d)>();
        commands.entity(entity).insert(TERRAIN);
    }
}

/// Outlines the chunk footprints.
fn debug(mut gizmos: Gizmos, query: Query<(&GlobalTransform, &TerrainRequest)>) {
    for (transform, request) in query.iter() {
        let Ok(grid) = ChunkGrid::new(request.size, request.level_count) else {
            continue;
        };
        for chunk in grid.chunks() {
            let half_extents = Vec3::splat(chunk.size) / 2.0;
            let origin = Vec3::new(chunk.origin.x, chunk.origin.y, chunk.origin.z);
            let center = transform.translation() + origin + half_extents;
            gizmos.cube(
                Transform::from_translation(center).with_scale(half_extents * 2.0),
                Color::WHITE,
            );
        }
    }
}
