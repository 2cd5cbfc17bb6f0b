use crate::types::Quaternion;

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Append-only store of captured poses.
///
/// Per joint an ordered sequence of orientation samples, plus one time marker
/// sequence shared by all joints. A capture event appends exactly one sample
/// to every joint's sequence, so at all times every sequence has the same
/// length as the marker sequence. Nothing is ever removed or edited; the store
/// lives as long as the loaded rig.
#[derive(Debug)]
pub struct PoseCaptureStore {
    pose_sequences: Vec<Vec<Quaternion>>,
    time_markers: Vec<f64>,
}

impl PoseCaptureStore {
    pub fn new(num_joints: usize) -> Self {
        PoseCaptureStore {
            pose_sequences: vec![Vec::new(); num_joints],
            time_markers: Vec::new(),
        }
    }

    pub fn num_joints(&self) -> usize {
        self.pose_sequences.len()
    }

    /// Number of capture events so far.
    pub fn num_samples(&self) -> usize {
        self.time_markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_markers.is_empty()
    }

    pub fn time_markers(&self) -> &[f64] {
        &self.time_markers
    }

    pub fn pose_sequence(&self, joint_index: usize) -> &[Quaternion] {
        &self.pose_sequences[joint_index]
    }

    /// Record one capture event: one orientation per joint, in joint index order,
    /// plus the next time marker (the next integer after the current count).
    ///
    /// Panics if `orientations` doesn't cover every joint; the session always
    /// hands over the full live pose.
    pub fn capture(&mut self, orientations: &[Quaternion]) {
        assert_eq!(
            orientations.len(),
            self.pose_sequences.len(),
            "capture needs one orientation per joint"
        );
        for (sequence, &orientation) in self.pose_sequences.iter_mut().zip(orientations) {
            sequence.push(orientation);
        }
        self.time_markers.push((self.time_markers.len() + 1) as f64);
    }

    /// Close the loop: re-append every joint's *first* captured sample so playback
    /// returns to the starting pose. Deliberately ignores the live pose; this is a
    /// loop-closing policy, not a capture. No-op while the store is empty.
    pub fn close_loop(&mut self) {
        if self.is_empty() {
            return;
        }
        for sequence in self.pose_sequences.iter_mut() {
            let first = sequence[0];
            sequence.push(first);
        }
        self.time_markers.push((self.time_markers.len() + 1) as f64);
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Rotation3;

    fn quat(angle: f64) -> Quaternion {
        Quaternion::from_angle_z(cgmath::Rad(angle))
    }

    #[test]
    fn sequences_stay_in_lockstep_with_markers() {
        let mut store = PoseCaptureStore::new(3);
        for i in 0..5 {
            store.capture(&[quat(0.1 * i as f64); 3]);
            for j in 0..3 {
                assert_eq!(store.pose_sequence(j).len(), store.time_markers().len());
            }
        }
        assert_eq!(store.num_samples(), 5);
    }

    #[test]
    fn markers_are_consecutive_integers_from_one() {
        let mut store = PoseCaptureStore::new(1);
        store.capture(&[quat(0.0)]);
        store.capture(&[quat(0.0)]);
        store.capture(&[quat(0.0)]);
        assert_eq!(store.time_markers(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn markers_strictly_increase() {
        let mut store = PoseCaptureStore::new(2);
        for _ in 0..4 {
            store.capture(&[quat(1.0), quat(2.0)]);
        }
        store.close_loop();
        let markers = store.time_markers();
        for pair in markers.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn capture_without_mutation_repeats_the_orientation() {
        let mut store = PoseCaptureStore::new(2);
        let pose = [quat(0.3), quat(0.7)];
        store.capture(&pose);
        store.capture(&pose);
        store.capture(&pose);
        for j in 0..2 {
            let sequence = store.pose_sequence(j);
            assert_eq!(sequence.len(), 3);
            assert!(sequence.iter().all(|&q| q == pose[j]));
        }
    }

    #[test]
    fn close_loop_reappends_the_first_sample() {
        let mut store = PoseCaptureStore::new(1);
        store.capture(&[quat(0.1)]);
        store.capture(&[quat(0.9)]);
        store.close_loop();
        let sequence = store.pose_sequence(0);
        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence[2], sequence[0]);
        assert_eq!(store.time_markers(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn close_loop_on_empty_store_is_a_noop() {
        let mut store = PoseCaptureStore::new(2);
        store.close_loop();
        assert!(store.is_empty());
        assert_eq!(store.pose_sequence(0).len(), 0);
    }
}
