//! Interactive 3D window.
//!
//! Draws the E and B curves of every wave as gizmo line strips and loops the
//! frame sequence at the timeline's frame rate. `Space` pauses, `Escape`
//! closes the window.

use bevy::app::AppExit;
use bevy::prelude::*;

use crate::animation::{AnimationDriver, Frame};
use crate::io::WAVE_PALETTE;
use crate::math::Scalar;

/// Half-length of the propagation axis in world units.
const AXIS_HALF_LENGTH: f32 = 8.0;
/// Half-width of the transverse axes in world units.
const TRANSVERSE_HALF_WIDTH: f32 = 2.5;

#[derive(Resource)]
struct Playback {
    driver: AnimationDriver,
    frame: Option<Frame>,
    index: usize,
    elapsed: f32,
    paused: bool,
    axial: (Scalar, Scalar),
    transverse: Scalar,
}

impl Playback {
    fn new(driver: AnimationDriver) -> Self {
        let layout = driver.layout();
        let axial = (layout.grid.start(), layout.grid.stop());
        let transverse = layout.peak_electric().max(layout.peak_magnetic());
        let frame = driver.frame(0);
        Self {
            driver,
            frame,
            index: 0,
            elapsed: 0.0,
            paused: false,
            axial,
            transverse,
        }
    }

    fn to_world(&self, position: Scalar, y: Scalar, z: Scalar) -> Vec3 {
        let (start, stop) = self.axial;
        let along = ((position - start) / (stop - start)) as f32;
        let scale = TRANSVERSE_HALF_WIDTH / self.transverse as f32;
        Vec3::new(
            (along * 2.0 - 1.0) * AXIS_HALF_LENGTH,
            y as f32 * scale,
            z as f32 * scale,
        )
    }
}

#[derive(Component)]
struct InfoText;

/// Opens the window and blocks until it is closed.
pub fn run(driver: AnimationDriver) {
    let title = match driver.waves() {
        [single] => format!("em-wave: {}", single.medium().name()),
        _ => "em-wave: medium comparison".to_owned(),
    };
    App::new()
        .insert_resource(Playback::new(driver))
        .insert_resource(ClearColor(Color::rgb(0.04, 0.04, 0.06)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title,
                resolution: (1200.0, 720.0).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_systems(Startup, setup)
        .add_systems(Update, (handle_input, advance, draw_fields, update_text).chain())
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera3dBundle {
        transform: Transform::from_xyz(-6.0, 5.0, 14.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
    commands.spawn((
        InfoText,
        TextBundle::from_sections([TextSection::new(
            "",
            TextStyle {
                font_size: 22.0,
                color: Color::WHITE,
                ..default()
            },
        )])
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(16.0),
            left: Val::Px(16.0),
            ..default()
        }),
    ));
}

fn handle_input(
    mut playback: ResMut<Playback>,
    keys: Res<ButtonInput<KeyCode>>,
    mut exit: EventWriter<AppExit>,
) {
    if keys.just_pressed(KeyCode::Space) {
        playback.paused = !playback.paused;
    }
    if keys.just_pressed(KeyCode::Escape) {
        exit.send(AppExit);
    }
}

fn advance(mut playback: ResMut<Playback>, time: Res<Time>) {
    if playback.paused {
        return;
    }
    let timeline = *playback.driver.timeline();
    let step = timeline.time_step() as f32;
    playback.elapsed += time.delta_seconds();
    let mut moved = false;
    while playback.elapsed >= step {
        playback.elapsed -= step;
        playback.index = (playback.index + 1) % timeline.frame_count();
        moved = true;
    }
    if moved {
        let frame = playback.driver.frame(playback.index);
        playback.frame = frame;
    }
}

fn lighten(color: Color, amount: f32) -> Color {
    Color::rgb(
        color.r() + (1.0 - color.r()) * amount,
        color.g() + (1.0 - color.g()) * amount,
        color.b() + (1.0 - color.b()) * amount,
    )
}

fn draw_fields(playback: Res<Playback>, mut gizmos: Gizmos) {
    let axis = Color::rgb(0.6, 0.6, 0.6);
    gizmos.line(
        Vec3::new(-AXIS_HALF_LENGTH, 0.0, 0.0),
        Vec3::new(AXIS_HALF_LENGTH, 0.0, 0.0),
        axis,
    );
    let Some(frame) = &playback.frame else {
        return;
    };
    for (k, buffer) in frame.buffers.iter().enumerate() {
        let (r, g, b) = WAVE_PALETTE[k % WAVE_PALETTE.len()];
        let color = Color::rgb_u8(r, g, b);
        gizmos.linestrip(
            buffer
                .samples
                .iter()
                .map(|s| playback.to_world(s.position, s.electric.y, s.electric.z)),
            color,
        );
        gizmos.linestrip(
            buffer
                .samples
                .iter()
                .map(|s| playback.to_world(s.position, s.magnetic.y, s.magnetic.z)),
            lighten(color, 0.5),
        );
    }
}

fn update_text(playback: Res<Playback>, mut query: Query<&mut Text, With<InfoText>>) {
    let Some(frame) = &playback.frame else {
        return;
    };
    let names: Vec<&str> = playback.driver.waves().iter().map(|w| w.medium().name()).collect();
    for mut text in &mut query {
        text.sections[0].value = format!(
            "t = {:.2} s  frame {}/{}\n{}\n{}",
            frame.time,
            frame.index + 1,
            playback.driver.frame_count(),
            names.join(", "),
            if playback.paused { "paused (space to resume)" } else { "space: pause  esc: quit" },
        );
    }
}
