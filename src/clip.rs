use crate::capture::PoseCaptureStore;
use crate::types::{Quaternion, RigMetadata};

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Sentinel for [`Clip::duration`]: derive the duration from the tracks' last keyframes.
pub const DURATION_FROM_TRACKS: f64 = -1.0;

/// One joint's keyframes: time markers paired with orientation samples flattened
/// into the numeric layout the playback runtime consumes, four scalars
/// (x, y, z, w) per sample in sequence order.
#[derive(Debug, Clone)]
pub struct QuaternionTrack {
    pub target: String,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl QuaternionTrack {
    pub fn num_keyframes(&self) -> usize {
        self.times.len()
    }

    /// Rebuild the orientation of keyframe `i` from the flattened layout.
    pub fn keyframe(&self, i: usize) -> Quaternion {
        let v = &self.values[i * 4..i * 4 + 4];
        Quaternion::new(v[3], v[0], v[1], v[2])
    }
}

/// A named, playable collection of keyframe tracks.
#[derive(Debug, Clone)]
pub struct Clip {
    pub name: String,
    pub duration: f64,
    pub tracks: Vec<QuaternionTrack>,
}

impl Clip {
    /// Effective duration: resolves [`DURATION_FROM_TRACKS`] to the latest time
    /// marker across all tracks (0.0 when every track is empty).
    pub fn effective_duration(&self) -> f64 {
        if self.duration >= 0.0 {
            return self.duration;
        }
        self.tracks
            .iter()
            .filter_map(|track| track.times.last().copied())
            .fold(0.0, f64::max)
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Assemble the captured pose sequences into a clip: one quaternion track per joint,
/// in joint index order, all sharing the store's time marker sequence.
///
/// A joint with no captured samples yields a degenerate empty track; rejecting or
/// skipping it is left to playback, which handles short tracks totally.
pub fn assemble(rig: &RigMetadata, store: &PoseCaptureStore, name: &str) -> Clip {
    let tracks = rig
        .joints
        .iter()
        .map(|joint| {
            let sequence = store.pose_sequence(joint.index);
            let values = sequence
                .iter()
                .flat_map(|q| [q.v.x, q.v.y, q.v.z, q.s])
                .collect();
            QuaternionTrack {
                target: joint.name.clone(),
                times: store.time_markers().to_vec(),
                values,
            }
        })
        .collect();

    Clip {
        name: name.to_string(),
        duration: DURATION_FROM_TRACKS,
        tracks,
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// One-shot play handle for an assembled clip.
///
/// `play` resets the play head and starts from the beginning; invoking it again
/// simply restarts. No looping, blending or cancellation.
#[derive(Debug)]
pub struct ClipAction {
    pub clip: Clip,
    time: f64,
    playing: bool,
}

impl ClipAction {
    pub fn new(clip: Clip) -> Self {
        ClipAction {
            clip,
            time: 0.0,
            playing: false,
        }
    }

    pub fn play(&mut self) {
        self.time = 0.0;
        self.playing = true;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advance the play head. Stops (clamped to the end) once the clip's
    /// effective duration is reached.
    pub fn update(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        self.time += dt;
        let duration = self.clip.effective_duration();
        if self.time >= duration {
            self.time = duration;
            self.playing = false;
        }
    }

    /// Sample one track at time `t`, slerping between the bracketing keyframes.
    /// Total over degenerate input: an empty track samples as identity, a
    /// single-keyframe track as its only value, and `t` outside the marker range
    /// clamps to the first/last keyframe.
    pub fn sample(&self, track_index: usize, t: f64) -> Quaternion {
        let track = &self.clip.tracks[track_index];
        let n = track.num_keyframes();
        if n == 0 {
            return Quaternion::new(1.0, 0.0, 0.0, 0.0);
        }
        if t <= track.times[0] {
            return track.keyframe(0);
        }
        if t >= track.times[n - 1] {
            return track.keyframe(n - 1);
        }
        // n >= 2 here; find the keyframe pair bracketing t
        let next = track.times.partition_point(|&time| time <= t);
        let (t0, t1) = (track.times[next - 1], track.times[next]);
        let amount = (t - t0) / (t1 - t0);
        track.keyframe(next - 1).slerp(track.keyframe(next), amount)
    }

    /// Sample every track at the current play head position, in track order.
    pub fn sample_all(&self) -> Vec<Quaternion> {
        (0..self.clip.tracks.len())
            .map(|i| self.sample(i, self.time))
            .collect()
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::load_rig_from_string;
    use cgmath::{Rad, Rotation3};
    use std::f64::consts::PI;

    const TWO_JOINT: &str = "\
HIERARCHY
ROOT hips
{
    OFFSET 0.0 0.0 0.0
    JOINT arm_upper_R
    {
        OFFSET 0.0 0.5 0.0
        End Site
        {
            OFFSET 0.0 0.25 0.0
        }
    }
}
";

    fn captured_store() -> (RigMetadata, PoseCaptureStore) {
        let (rig, _) = load_rig_from_string(TWO_JOINT).unwrap();
        let mut store = PoseCaptureStore::new(rig.num_joints());
        for i in 0..3 {
            let q = Quaternion::from_angle_z(Rad(i as f64 * PI / 4.0));
            store.capture(&[q, q]);
        }
        (rig, store)
    }

    #[test]
    fn two_joints_three_samples_flatten_as_expected() {
        let (rig, store) = captured_store();
        let clip = assemble(&rig, &store, "captured");

        assert_eq!(clip.tracks.len(), 2);
        for track in &clip.tracks {
            assert_eq!(track.times, vec![1.0, 2.0, 3.0]);
            assert_eq!(track.values.len(), 12); // 3 samples x 4 components
        }
        assert_eq!(clip.tracks[0].target, "hips");
        assert_eq!(clip.tracks[1].target, "arm_upper_R");
    }

    #[test]
    fn flattened_layout_round_trips_through_keyframe() {
        let (rig, store) = captured_store();
        let clip = assemble(&rig, &store, "captured");
        let track = &clip.tracks[1];
        for i in 0..3 {
            assert_eq!(track.keyframe(i), store.pose_sequence(1)[i]);
        }
    }

    #[test]
    fn duration_sentinel_resolves_to_last_marker() {
        let (rig, store) = captured_store();
        let clip = assemble(&rig, &store, "captured");
        assert_eq!(clip.duration, DURATION_FROM_TRACKS);
        assert_eq!(clip.effective_duration(), 3.0);
    }

    #[test]
    fn empty_store_assembles_degenerate_tracks() {
        let (rig, _) = load_rig_from_string(TWO_JOINT).unwrap();
        let store = PoseCaptureStore::new(rig.num_joints());
        let clip = assemble(&rig, &store, "empty");
        assert_eq!(clip.tracks.len(), 2);
        assert!(clip.tracks.iter().all(|t| t.num_keyframes() == 0));
        assert_eq!(clip.effective_duration(), 0.0);

        // degenerate tracks must still sample without panicking
        let action = ClipAction::new(clip);
        assert_eq!(action.sample(0, 1.0), Quaternion::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn playback_is_one_shot_and_restartable() {
        let (rig, store) = captured_store();
        let mut action = ClipAction::new(assemble(&rig, &store, "captured"));

        action.play();
        assert!(action.is_playing());
        action.update(10.0);
        assert!(!action.is_playing());
        assert_eq!(action.time(), 3.0);

        // playing again resets the play head first
        action.play();
        assert_eq!(action.time(), 0.0);
        assert!(action.is_playing());
    }

    #[test]
    fn sampling_interpolates_between_markers() {
        let (rig, store) = captured_store();
        let action = ClipAction::new(assemble(&rig, &store, "captured"));

        // exactly on a marker returns the captured sample
        assert_eq!(action.sample(1, 2.0), store.pose_sequence(1)[1]);

        // halfway between the first two markers lands halfway between the angles
        let mid = action.sample(1, 1.5);
        let expected = Quaternion::from_angle_z(Rad(PI / 8.0));
        assert!((mid.s - expected.s).abs() < 1e-9);
        assert!((mid.v.z - expected.v.z).abs() < 1e-9);

        // outside the marker range clamps
        assert_eq!(action.sample(1, 0.0), store.pose_sequence(1)[0]);
        assert_eq!(action.sample(1, 99.0), store.pose_sequence(1)[2]);
    }
}
