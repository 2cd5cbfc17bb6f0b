use crate::clip::ClipAction;
use crate::fk;
use crate::session::AnimationSession;
use crate::slider::{slider_to_angle, SLIDER_MAX, SLIDER_MIN};
use crate::types::{Axis, Index, Position, Quaternion};
use bevy::prelude::*;
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use std::f64::consts::PI;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Angle range every slider maps onto.
const ANGLE_MIN: f64 = -PI;
const ANGLE_MAX: f64 = PI;

#[derive(Debug, Resource)]
pub struct AppGlobalData {
    pub session: AnimationSession,
    pub kinematic_chain: Vec<Vec<Index>>,
    /// One control value in [SLIDER_MIN, SLIDER_MAX] per (joint, axis) pair.
    pub slider_values: Vec<[i32; 3]>,
    pub selected_joint: Index,
    pub selected_axis: Axis,
    pub action: Option<ClipAction>,
    pub rest_pose_mode: bool,
    pub scale: f32,
    pub debug_text: bool,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Run the interactive posing demo on a loaded session.
/// (use scale when your skeleton is in different units than meters, e.g. centimeters)
pub fn run_posing_demo(session: AnimationSession, scale: f32) {
    let kinematic_chain = fk::kinematic_chains(session.rig());
    let num_joints = session.rig().num_joints();

    App::new()
        .insert_resource(AppGlobalData {
            session,
            kinematic_chain,
            slider_values: vec![[(SLIDER_MIN + SLIDER_MAX) / 2; 3]; num_joints],
            selected_joint: 0,
            selected_axis: Axis::Z,
            action: None,
            rest_pose_mode: false,
            scale: 1.0 / scale, // reciprocal, all positions are divided by it
            debug_text: false,
        })
        .add_plugins(DefaultPlugins)
        .add_plugins(PanOrbitCameraPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, (update_main, draw_skeleton, update_debug_text))
        .run();
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

// A unit struct to help identify the debug UI component, since there may be many Text components
#[derive(Component)]
struct DebugText;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    //// Orbit camera
    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_xyz(0., 1.5, 6.).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        PanOrbitCamera::default(),
    ));
    // draw plane
    commands.spawn(PbrBundle {
        mesh: meshes.add(Plane3d::default().mesh().size(5.0, 5.0)),
        material: materials.add(StandardMaterial {
            base_color: Color::rgba(1., 1., 1., 0.5),
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            ..default()
        }),
        ..default()
    });

    // draw instructions
    commands.spawn(
        TextBundle::from_section(
            "Press 'Up'/'Down' to select a joint\n\
            Press 'X', 'Y' or 'Z' to select the rotation axis\n\
            Press 'Left'/'Right' to move the selected slider\n\
            Press 'C' to capture the current pose\n\
            Press 'F' to finish the animation (loop back to the first pose)\n\
            Press 'Space' to play the captured animation\n\
            Press 'R' to toggle rest pose mode\n\
            Press 'D' to toggle debug text\n",
            TextStyle {
                font_size: 15.,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            right: Val::Px(12.0),
            ..default()
        }),
    );

    // draw debug text
    commands.spawn((
        TextBundle::from_section(
            "Debug text",
            TextStyle {
                font_size: 17.,
                color: Color::rgba(1.0, 1.0, 1.0, 0.5),
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            display: Display::Flex,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        }),
        DebugText,
    ));
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Draw joint axes (red, green, blue) at the joint position.
fn draw_joint_axes(gizmos: &mut Gizmos, rotation: &Quaternion, position: &Position, scale: f32) {
    let position = Vec3::new(position.x as f32, position.y as f32, position.z as f32) / scale;
    // convert quaternion to matrix 3x3
    let mut rotation: cgmath::Matrix3<f64> = cgmath::Matrix3::from(*rotation);
    // increase scale for longer axes
    rotation.x = rotation.x * 0.2;
    rotation.y = rotation.y * 0.2;
    rotation.z = rotation.z * 0.2;
    // draw axes
    let x_axis =
        Vec3::new(rotation.x.x as f32, rotation.x.y as f32, rotation.x.z as f32) / scale + position;
    let y_axis =
        Vec3::new(rotation.y.x as f32, rotation.y.y as f32, rotation.y.z as f32) / scale + position;
    let z_axis =
        Vec3::new(rotation.z.x as f32, rotation.z.y as f32, rotation.z.z as f32) / scale + position;

    gizmos.line(position, x_axis, Color::RED);
    gizmos.line(position, y_axis, Color::GREEN);
    gizmos.line(position, z_axis, Color::BLUE);
}

/// Draw a sphere at the joint position. The selected joint is drawn bigger and orange.
fn draw_joint_sphere(gizmos: &mut Gizmos, position: &Position, scale: f32, selected: bool) {
    let position = Vec3::new(position.x as f32, position.y as f32, position.z as f32) / scale;
    let (radius, color) = if selected {
        (0.07 / scale, Color::ORANGE)
    } else {
        (0.04 / scale, Color::WHITE)
    };
    gizmos.sphere(position, Quat::IDENTITY, radius, color);
}

/// The pose currently shown on screen: the playing clip if there is one,
/// otherwise the live preview pose.
fn current_local_pose(appdata: &AppGlobalData) -> Vec<Quaternion> {
    if let Some(action) = &appdata.action {
        if action.is_playing() {
            return action.sample_all();
        }
    }
    appdata.session.live_pose()
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn draw_skeleton(mut gizmos: Gizmos, appdata: Res<AppGlobalData>) {
    let scale = appdata.scale;
    let session = &appdata.session;

    let (positions, rotations) = if appdata.rest_pose_mode {
        (
            session.data().rest_global_positions.clone(),
            session.data().rest_global_rotations.clone(),
        )
    } else {
        let local = current_local_pose(&appdata);
        fk::global_pose(session.rig(), session.data(), &local)
    };

    //// Draw the skeleton lines
    for chain in appdata.kinematic_chain.iter() {
        let points = chain
            .iter()
            .map(|&joint_index| {
                let pos = positions[joint_index];
                Vec3::new(pos.x as f32, pos.y as f32, pos.z as f32) / scale
            })
            .collect::<Vec<_>>();
        gizmos.linestrip(points, Color::YELLOW);
    }

    //// Draw the joints as spheres. Draw the axes of the joints.
    for joint in &session.rig().joints {
        let i = joint.index;
        draw_joint_sphere(&mut gizmos, &positions[i], scale, i == appdata.selected_joint);
        draw_joint_axes(&mut gizmos, &rotations[i], &positions[i], scale);
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn update_main(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut appdata: ResMut<AppGlobalData>,
) {
    let num_joints = appdata.session.rig().num_joints();

    //// joint and axis selection
    if keyboard.just_released(KeyCode::ArrowUp) {
        appdata.selected_joint = (appdata.selected_joint + num_joints - 1) % num_joints;
    }
    if keyboard.just_released(KeyCode::ArrowDown) {
        appdata.selected_joint = (appdata.selected_joint + 1) % num_joints;
    }
    if keyboard.just_released(KeyCode::KeyX) {
        appdata.selected_axis = Axis::X;
    }
    if keyboard.just_released(KeyCode::KeyY) {
        appdata.selected_axis = Axis::Y;
    }
    if keyboard.just_released(KeyCode::KeyZ) {
        appdata.selected_axis = Axis::Z;
    }

    //// slider input: each step emits a control value which is mapped to an angle
    //// and applied to exactly one axis of the selected joint
    let step = if keyboard.just_released(KeyCode::ArrowLeft) {
        -1
    } else if keyboard.just_released(KeyCode::ArrowRight) {
        1
    } else {
        0
    };
    if step != 0 {
        let joint = appdata.selected_joint;
        let axis = appdata.selected_axis;
        let slot = match axis {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        };
        let value =
            (appdata.slider_values[joint][slot] + step).clamp(SLIDER_MIN, SLIDER_MAX);
        appdata.slider_values[joint][slot] = value;

        let angle = slider_to_angle(value, ANGLE_MIN, ANGLE_MAX);
        let name = appdata.session.rig().find_joint_by_index(joint).name.clone();
        appdata.session.set_axis_rotation(&name, axis, angle);
    }

    //// capture / finish / play
    if keyboard.just_released(KeyCode::KeyC) {
        appdata.session.capture_pose();
    }
    if keyboard.just_released(KeyCode::KeyF) {
        appdata.session.close_loop();
    }
    if keyboard.just_released(KeyCode::Space) {
        let clip = appdata.session.assemble_clip("captured_poses");
        let action = appdata.action.insert(ClipAction::new(clip));
        action.play();
    }

    //// advance the play head
    if let Some(action) = &mut appdata.action {
        action.update(time.delta_seconds_f64());
    }

    //// display toggles
    if keyboard.just_released(KeyCode::KeyR) {
        appdata.rest_pose_mode = !appdata.rest_pose_mode;
    }
    if keyboard.just_released(KeyCode::KeyD) {
        appdata.debug_text = !appdata.debug_text;
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn update_debug_text(mut query: Query<&mut Text, With<DebugText>>, appdata: Res<AppGlobalData>) {
    let session = &appdata.session;
    let selected = session.rig().find_joint_by_index(appdata.selected_joint);

    let mut t: String = "".to_string();
    t += &format!(
        "Selected: {} | axis {:?} | captured poses: {}",
        selected.name,
        appdata.selected_axis,
        session.store().num_samples()
    );
    if let Some(action) = &appdata.action {
        t += &format!(
            " | playback {:.2}/{:.2}{}",
            action.time(),
            action.clip.effective_duration(),
            if action.is_playing() { " (playing)" } else { "" }
        );
    }
    t += "\n";
    t += "=============== SLIDER VALUES (X Y Z) ===============\n";
    for joint in &session.rig().joints {
        let values = appdata.slider_values[joint.index];
        t += &format!(
            "{:.<20} {: ^5} {: ^5} {: ^5}\n",
            joint.name, values[0], values[1], values[2]
        );
    }

    for mut text in &mut query {
        if appdata.debug_text {
            text.sections[0].value = t.clone();
        } else {
            text.sections[0].value = "".to_string();
        }
    }
}
