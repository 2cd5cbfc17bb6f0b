use crate::capture::PoseCaptureStore;
use crate::clip::{self, Clip};
use crate::types::{Axis, Index, Position, Quaternion, RigData, RigMetadata};
use cgmath::{Rad, Rotation3};

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Everything one posing session owns: the loaded rig, the live pose being
/// previewed, and the captured pose sequences. The app creates one of these at
/// model load time and hands it by reference to whichever handler needs it.
#[derive(Debug)]
pub struct AnimationSession {
    rig: RigMetadata,
    data: RigData,
    /// Live pose, one X/Y/Z radian triple per joint. These angles are the single
    /// source of truth for the preview; the quaternion handed to capture is always
    /// composed from them, so preview and captured samples cannot drift apart.
    axis_angles: Vec<Position>,
    store: PoseCaptureStore,
}

/// Compose the three per-axis angles into one local orientation, X then Y then Z.
fn __compose_local_rotation(angles: Position) -> Quaternion {
    Quaternion::from_angle_x(Rad(angles.x))
        * Quaternion::from_angle_y(Rad(angles.y))
        * Quaternion::from_angle_z(Rad(angles.z))
}

impl AnimationSession {
    pub fn new(rig: RigMetadata, data: RigData) -> Self {
        let num_joints = rig.num_joints();
        AnimationSession {
            rig,
            data,
            axis_angles: vec![Position::new(0.0, 0.0, 0.0); num_joints],
            store: PoseCaptureStore::new(num_joints),
        }
    }

    pub fn rig(&self) -> &RigMetadata {
        &self.rig
    }

    pub fn data(&self) -> &RigData {
        &self.data
    }

    pub fn store(&self) -> &PoseCaptureStore {
        &self.store
    }

    ////////////////////////////////// live pose //////////////////////////////////

    /// Set one rotation axis of the named joint, leaving the other two axes
    /// untouched. Unknown joint names are a silent no-op (the rig simply doesn't
    /// have that bone); only a debug trace is emitted.
    pub fn set_axis_rotation(&mut self, name: &str, axis: Axis, angle: f64) {
        let Some(joint) = self.rig.find_joint_by_name(name) else {
            log::debug!("set_axis_rotation: no joint named {name:?}, ignoring");
            return;
        };
        let angles = &mut self.axis_angles[joint.index];
        match axis {
            Axis::X => angles.x = angle,
            Axis::Y => angles.y = angle,
            Axis::Z => angles.z = angle,
        }
    }

    /// Read back one axis angle, for UI display. `None` for unknown names.
    pub fn axis_rotation(&self, name: &str, axis: Axis) -> Option<f64> {
        let joint = self.rig.find_joint_by_name(name)?;
        let angles = self.axis_angles[joint.index];
        Some(match axis {
            Axis::X => angles.x,
            Axis::Y => angles.y,
            Axis::Z => angles.z,
        })
    }

    /// Canonical local orientation of one joint, composed from its axis angles.
    pub fn local_rotation(&self, index: Index) -> Quaternion {
        __compose_local_rotation(self.axis_angles[index])
    }

    /// The full live pose, one orientation per joint in joint index order.
    pub fn live_pose(&self) -> Vec<Quaternion> {
        (0..self.rig.num_joints())
            .map(|i| self.local_rotation(i))
            .collect()
    }

    ////////////////////////////////// capture //////////////////////////////////

    /// Snapshot the current live pose into the capture store (one capture event).
    pub fn capture_pose(&mut self) {
        let pose = self.live_pose();
        self.store.capture(&pose);
    }

    /// Finish the animation: re-append every joint's first captured sample so the
    /// clip returns to its starting pose. Does not read the live pose.
    pub fn close_loop(&mut self) {
        self.store.close_loop();
    }

    /// Assemble everything captured so far into a playable clip.
    pub fn assemble_clip(&self, name: &str) -> Clip {
        clip::assemble(&self.rig, &self.store, name)
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::load_rig_from_string;
    use std::f64::consts::PI;

    const RIG: &str = "\
HIERARCHY
ROOT hips
{
    OFFSET 0.0 1.0 0.0
    JOINT arm_upper_R
    {
        OFFSET 0.0 0.5 0.0
        JOINT arm_lower_R
        {
            OFFSET 0.0 0.4 0.0
            End Site
            {
                OFFSET 0.0 0.2 0.0
            }
        }
    }
}
";

    fn session() -> AnimationSession {
        let (rig, data) = load_rig_from_string(RIG).unwrap();
        AnimationSession::new(rig, data)
    }

    #[test]
    fn mutator_sets_exactly_one_axis() {
        let mut s = session();
        s.set_axis_rotation("arm_upper_R", Axis::X, 0.4);
        s.set_axis_rotation("arm_upper_R", Axis::Y, -0.2);

        let x_before = s.axis_rotation("arm_upper_R", Axis::X).unwrap();
        let y_before = s.axis_rotation("arm_upper_R", Axis::Y).unwrap();

        s.set_axis_rotation("arm_upper_R", Axis::Z, 1.3);

        // the other two axes are bit-identical to their pre-call values
        assert_eq!(s.axis_rotation("arm_upper_R", Axis::X).unwrap(), x_before);
        assert_eq!(s.axis_rotation("arm_upper_R", Axis::Y).unwrap(), y_before);
        assert_eq!(s.axis_rotation("arm_upper_R", Axis::Z).unwrap(), 1.3);
    }

    #[test]
    fn mutator_is_idempotent() {
        let mut s = session();
        s.set_axis_rotation("arm_lower_R", Axis::Y, 0.8);
        let once = s.live_pose();
        s.set_axis_rotation("arm_lower_R", Axis::Y, 0.8);
        assert_eq!(s.live_pose(), once);
    }

    #[test]
    fn unknown_joint_is_a_silent_noop() {
        let mut s = session();
        let before = s.live_pose();
        s.set_axis_rotation("tail_03", Axis::Z, 2.0);
        assert_eq!(s.live_pose(), before);
        assert_eq!(s.axis_rotation("tail_03", Axis::Z), None);
    }

    #[test]
    fn slider_driven_z_rotation_reaches_pi() {
        let mut s = session();
        let angle = crate::slider::slider_to_angle(30, 0.0, PI);
        s.set_axis_rotation("arm_upper_R", Axis::Z, angle);

        let got = s.axis_rotation("arm_upper_R", Axis::Z).unwrap();
        assert!((got - PI).abs() < 1e-12);

        // composed orientation matches a pure Z rotation by pi
        let index = s.rig().find_joint_by_name("arm_upper_R").unwrap().index;
        let expected = Quaternion::from_angle_z(Rad(PI));
        let q = s.local_rotation(index);
        assert!((q.s - expected.s).abs() < 1e-12);
        assert!((q.v.z - expected.v.z).abs() < 1e-12);
    }

    #[test]
    fn capture_keeps_sequences_and_markers_in_lockstep() {
        let mut s = session();
        s.capture_pose();
        s.set_axis_rotation("arm_upper_R", Axis::Z, 1.0);
        s.capture_pose();
        s.close_loop();

        let store = s.store();
        assert_eq!(store.time_markers(), &[1.0, 2.0, 3.0]);
        for j in 0..s.rig().num_joints() {
            assert_eq!(store.pose_sequence(j).len(), 3);
        }
        // the loop-closing sample is the first one, not the live pose
        let arm = s.rig().find_joint_by_name("arm_upper_R").unwrap().index;
        assert_eq!(store.pose_sequence(arm)[2], store.pose_sequence(arm)[0]);
        assert_ne!(store.pose_sequence(arm)[2], store.pose_sequence(arm)[1]);
    }
}
