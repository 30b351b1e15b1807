use bevy::core_pipeline::contrast_adaptive_sharpening::ContrastAdaptiveSharpeningSettings;
use bevy::core_pipeline::prepass::DepthPrepass;
use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use gloom::GloomPlugin;
use gloom::debug::DebugDumpPlugin;
use gloom::lighting::SampledLight;
use gloom::player::{Flashlight, Player, PlayerLook, camera_look, cursor_grab, fly_movement, toggle_flashlight};
use gloom::settings::loader as settings_loader;
use gloom::ui::{
    DebugOverlayState, DebugOverlayTimer, LightGizmosVisible, draw_light_gizmos,
    spawn_debug_overlay, toggle_debug_views, update_debug_overlay,
};

// Street lamps along the z axis; spacing leaves dark gaps between pools of light.
const LAMP_COUNT: i32 = 6;
const LAMP_SPACING: f32 = 14.0;
const LAMP_RANGE: f32 = 9.0;

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let ground = materials.add(StandardMaterial {
        base_color: Color::srgb(0.25, 0.26, 0.28),
        perceptual_roughness: 0.9,
        ..default()
    });
    let pole = materials.add(Color::srgb(0.12, 0.12, 0.13));

    commands.spawn(PbrBundle {
        mesh: meshes.add(Plane3d::default().mesh().size(60.0, 120.0)),
        material: ground,
        transform: Transform::from_xyz(0.0, 0.0, -35.0),
        ..default()
    });

    let pole_mesh = meshes.add(Cuboid::new(0.2, 4.0, 0.2));
    for i in 0..LAMP_COUNT {
        #[allow(clippy::cast_precision_loss)]
        let z = -(i as f32) * LAMP_SPACING;
        let x = if i % 2 == 0 { -3.0 } else { 3.0 };

        commands.spawn(PbrBundle {
            mesh: pole_mesh.clone(),
            material: pole.clone(),
            transform: Transform::from_xyz(x, 2.0, z),
            ..default()
        });
        commands.spawn((
            PointLightBundle {
                point_light: PointLight {
                    intensity: 600_000.0 + 250_000.0 * (i % 3) as f32,
                    range: LAMP_RANGE,
                    color: Color::srgb(1.0, 0.82, 0.6),
                    shadows_enabled: true,
                    ..default()
                },
                transform: Transform::from_xyz(x, 4.2, z),
                ..default()
            },
            SampledLight::default(),
        ));
    }

    // a harsh floodlight at the far end pushes the intensity past the depth of field threshold
    commands.spawn((
        SpotLightBundle {
            spot_light: SpotLight {
                intensity: 4_000_000.0,
                range: 18.0,
                outer_angle: 0.9,
                inner_angle: 0.6,
                shadows_enabled: true,
                ..default()
            },
            transform: Transform::from_xyz(0.0, 8.0, -85.0).looking_at(Vec3::new(0.0, 0.0, -85.0), Vec3::Z),
            ..default()
        },
        SampledLight { brightness_multiplier: 1.5 },
    ));

    // moonlight: weak, always in range
    commands.spawn((
        DirectionalLightBundle {
            directional_light: DirectionalLight {
                illuminance: 400.0,
                color: Color::srgb(0.6, 0.65, 0.85),
                ..default()
            },
            transform: Transform::from_xyz(0.0, 50.0, 0.0).looking_at(Vec3::new(0.3, 0.0, -1.0), Vec3::Y),
            ..default()
        },
        SampledLight::default(),
    ));

    commands
        .spawn((
            Camera3dBundle {
                transform: Transform::from_xyz(0.0, 1.7, 6.0),
                ..default()
            },
            DepthPrepass,
            ContrastAdaptiveSharpeningSettings::default(),
            Player,
            PlayerLook::default(),
        ))
        .with_children(|parent| {
            parent.spawn((
                SpotLightBundle {
                    spot_light: SpotLight {
                        intensity: 300_000.0,
                        range: 12.0,
                        outer_angle: 0.4,
                        inner_angle: 0.25,
                        ..default()
                    },
                    transform: Transform::from_xyz(0.3, -0.2, 0.0),
                    visibility: Visibility::Hidden,
                    ..default()
                },
                Flashlight,
                SampledLight::default(),
            ));
        });
}

fn main() {
    let settings = settings_loader::load_settings_from_dir(settings_loader::DEFAULT_SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(settings_loader::DEFAULT_SETTINGS_DIR)
        .unwrap_or_else(|e| {
            eprintln!("settings hot-reload disabled: {e}");
            settings_loader::SettingsWatcher::stub(settings_loader::DEFAULT_SETTINGS_DIR)
        });

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "gloom".into(),
                position: WindowPosition::Centered(MonitorSelection::Primary),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(LogDiagnosticsPlugin::default());

    // settings must be in place before the plugin so it doesn't insert defaults
    app.insert_resource(settings);
    app.insert_resource(settings_watcher);
    app.add_plugins(GloomPlugin);
    app.add_plugins(DebugDumpPlugin);

    app.insert_resource(ClearColor(Color::srgb(0.01, 0.01, 0.02)));
    app.init_resource::<DebugOverlayState>();
    app.init_resource::<DebugOverlayTimer>();
    app.init_resource::<LightGizmosVisible>();

    app.add_systems(Startup, setup_scene);
    app.add_systems(Startup, spawn_debug_overlay);
    app.add_systems(Update, (camera_look, fly_movement, cursor_grab, toggle_flashlight));
    app.add_systems(Update, (toggle_debug_views, update_debug_overlay, draw_light_gizmos));

    app.run();
}
