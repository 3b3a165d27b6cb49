use std::f32::consts::{FRAC_PI_2, TAU};

use apex_sim::CarColor;
use bevy::{
    pbr::{DistanceFog, FogFalloff},
    prelude::*,
};
use rand::Rng;

use crate::drive::{ActiveSession, CarSelected, ChaseCamera, PlayerCar};

const GROUND_SIZE: f32 = 2000.0;
const BUILDING_COUNT: usize = 200;
const CITY_HALF_EXTENT: f32 = 300.0;
const ARCH_COUNT: usize = 30;
const ARCH_RING_RADIUS: f32 = 120.0;
const STAR_COUNT: usize = 1500;
const STAR_SHELL_RADIUS: f32 = 200.0;
const STAR_SHELL_DEPTH: f32 = 60.0;

/// Marks the car body material that gets repainted on selection.
#[derive(Component)]
pub struct CarPaint;

pub fn car_color(color: CarColor) -> Color {
    Color::srgb_u8(color.r, color.g, color.b)
}

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    session: Res<ActiveSession>,
) {
    let camera = session.0.camera();
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(Vec3::from_array(camera.position.to_array()))
            .looking_at(Vec3::from_array(camera.look_target.to_array()), Vec3::Y),
        DistanceFog {
            color: Color::BLACK,
            falloff: FogFalloff::Linear {
                start: 40.0,
                end: 600.0,
            },
            ..default()
        },
        scene_ambient_light(),
        ChaseCamera,
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 12_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(30.0, 50.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Ground
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0x1b, 0x1f, 0x27),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        })),
    ));

    spawn_city(&mut commands, &mut meshes, &mut materials);
    spawn_stars(&mut commands, &mut meshes, &mut materials);
    spawn_track_arches(&mut commands, &mut meshes, &mut materials);
    spawn_car(
        &mut commands,
        &mut meshes,
        &mut materials,
        car_color(session.0.active_entry().color),
    );
}

/// Dim fill so faces the sun misses are not pure black.
pub fn scene_ambient_light() -> AmbientLight {
    AmbientLight {
        color: Color::srgb(0.6, 0.65, 0.8),
        brightness: 250.0,
        ..default()
    }
}

/// A point in the star shell, always above the horizon.
pub fn star_position(rng: &mut impl Rng) -> Vec3 {
    let azimuth = rng.random_range(0.0..TAU);
    let elevation = rng.random_range(0.05..FRAC_PI_2);
    let radius = STAR_SHELL_RADIUS + rng.random_range(0.0..STAR_SHELL_DEPTH);
    Vec3::new(
        radius * elevation.cos() * azimuth.sin(),
        radius * elevation.sin(),
        radius * elevation.cos() * azimuth.cos(),
    )
}

fn spawn_stars(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let star_mesh = meshes.add(Sphere::new(0.35));
    let star_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        emissive: LinearRgba::WHITE * 4.0,
        unlit: true,
        fog_enabled: false,
        ..default()
    });

    let mut rng = rand::rng();
    for _ in 0..STAR_COUNT {
        commands.spawn((
            Mesh3d(star_mesh.clone()),
            MeshMaterial3d(star_material.clone()),
            Transform::from_translation(star_position(&mut rng)),
        ));
    }
}

fn spawn_city(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let dark = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x11, 0x14, 0x18),
        metallic: 0.2,
        perceptual_roughness: 0.9,
        ..default()
    });
    let darker = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x0d, 0x0f, 0x12),
        metallic: 0.2,
        perceptual_roughness: 0.9,
        ..default()
    });

    let mut rng = rand::rng();
    for i in 0..BUILDING_COUNT {
        let x = rng.random_range(-CITY_HALF_EXTENT..CITY_HALF_EXTENT);
        let z = rng.random_range(-CITY_HALF_EXTENT..CITY_HALF_EXTENT);
        let height = rng.random_range(3.0..21.0);
        let width = rng.random_range(5.0..15.0);
        let depth = rng.random_range(5.0..15.0);
        let material = if i % 2 == 1 {
            dark.clone()
        } else {
            darker.clone()
        };

        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(width, height, depth))),
            MeshMaterial3d(material),
            Transform::from_xyz(x, height / 2.0, z),
        ));
    }
}

fn spawn_track_arches(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let arch_mesh = meshes.add(Torus::new(2.05, 2.35));
    let arch_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x4f, 0x46, 0xe5),
        emissive: LinearRgba::from(Color::srgb_u8(0x1d, 0x1b, 0x5e)) * 0.4,
        metallic: 0.8,
        perceptual_roughness: 0.2,
        ..default()
    });

    for i in 0..ARCH_COUNT {
        let angle = i as f32 / ARCH_COUNT as f32 * TAU;
        let base = Vec3::new(
            angle.sin() * ARCH_RING_RADIUS,
            0.0,
            angle.cos() * ARCH_RING_RADIUS,
        );

        commands
            .spawn((Transform::from_translation(base), Visibility::default()))
            .with_children(|parent| {
                // Torus meshes lie flat; stand the ring upright.
                parent.spawn((
                    Mesh3d(arch_mesh.clone()),
                    MeshMaterial3d(arch_material.clone()),
                    Transform::from_xyz(0.0, 2.0, 0.0)
                        .with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
                ));
                parent.spawn((
                    PointLight {
                        color: Color::srgb_u8(0x60, 0xa5, 0xfa),
                        intensity: 120_000.0,
                        range: 25.0,
                        ..default()
                    },
                    Transform::from_xyz(0.0, 3.0, 0.0),
                ));
            });
    }
}

fn spawn_car(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    paint: Color,
) {
    let body_material = materials.add(StandardMaterial {
        base_color: paint,
        metallic: 0.6,
        perceptual_roughness: 0.3,
        ..default()
    });
    let cabin_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x11, 0x11, 0x11),
        metallic: 0.4,
        perceptual_roughness: 0.6,
        ..default()
    });
    let tyre_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x15, 0x15, 0x15),
        ..default()
    });
    let wheel_mesh = meshes.add(Cylinder::new(0.45, 0.35));

    commands
        .spawn((
            Transform::default(),
            Visibility::default(),
            PlayerCar,
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(meshes.add(Cuboid::new(1.9, 0.5, 4.0))),
                MeshMaterial3d(body_material),
                Transform::default(),
                CarPaint,
            ));
            parent.spawn((
                Mesh3d(meshes.add(Cuboid::new(1.6, 0.6, 2.2))),
                MeshMaterial3d(cabin_material),
                Transform::from_xyz(0.0, 0.5, -0.2),
            ));

            for x in [-0.8, 0.8] {
                for z in [-1.3, 1.3] {
                    // Cylinders stand on Y; lay them on their side as wheels.
                    parent.spawn((
                        Mesh3d(wheel_mesh.clone()),
                        MeshMaterial3d(tyre_material.clone()),
                        Transform::from_xyz(x, -0.1, z)
                            .with_rotation(Quat::from_rotation_z(FRAC_PI_2)),
                    ));
                }
            }

            // Headlights, aimed down the car's forward (+Z) axis.
            for x in [-0.7, 0.7] {
                parent.spawn((
                    SpotLight {
                        color: Color::srgb_u8(0xaa, 0xf2, 0xff),
                        intensity: 400_000.0,
                        range: 20.0,
                        outer_angle: 0.5,
                        inner_angle: 0.3,
                        ..default()
                    },
                    Transform::from_xyz(x, 0.4, 2.2)
                        .looking_at(Vec3::new(x, 0.0, 12.0), Vec3::Y),
                ));
            }
        });
}

pub fn repaint_car(
    mut selections: MessageReader<CarSelected>,
    session: Res<ActiveSession>,
    paint_query: Query<&MeshMaterial3d<StandardMaterial>, With<CarPaint>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(selected) = selections.read().last() else {
        return;
    };
    let Some(entry) = session.0.catalog().get(selected.index) else {
        return;
    };
    for handle in &paint_query {
        if let Some(mut material) = materials.get_mut(&handle.0) {
            material.base_color = car_color(entry.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_colors_convert_to_srgb() {
        let color = car_color(CarColor::from_hex("#e11d48").unwrap());
        let srgba = color.to_srgba();
        assert!((srgba.red - 225.0 / 255.0).abs() < 1e-6);
        assert!((srgba.green - 29.0 / 255.0).abs() < 1e-6);
        assert!((srgba.blue - 72.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn ambient_fill_is_lit() {
        assert!(scene_ambient_light().brightness > 0.0);
    }

    #[test]
    fn stars_stay_in_the_upper_shell() {
        use rand::{SeedableRng, rngs::StdRng};

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let star = star_position(&mut rng);
            let radius = star.length();
            assert!(star.y > 0.0);
            assert!(radius >= STAR_SHELL_RADIUS - 1e-3);
            assert!(radius <= STAR_SHELL_RADIUS + STAR_SHELL_DEPTH + 1e-3);
        }
    }
}
