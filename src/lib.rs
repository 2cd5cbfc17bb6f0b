//! Pose a rigged skeleton joint by joint, capture a sequence of poses and
//! replay them as a quaternion keyframe animation.
//!
//! The rig is loaded from the HIERARCHY section of a .bvh file. Posing,
//! capture and clip assembly live in this crate; rendering, camera and input
//! plumbing belong to bevy behind the `visualize` feature.

pub mod capture;
pub mod clip;
pub mod fk;
pub mod parse;
pub mod session;
pub mod slider;
pub mod types;

#[cfg(feature = "visualize")]
pub mod visualize;
