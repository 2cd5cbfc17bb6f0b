use cgmath::{Quaternion as CgQuaternion, Vector3};
use std::collections::HashMap;

/////////////////////////////////////////////////////////////////////////////////////////////////

pub type Index = usize;
pub type ParentIndex = isize; // can be -1 if joint has no parent
pub type Quaternion = CgQuaternion<f64>;
pub type Position = Vector3<f64>;
pub type Depth = usize;

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Single-axis selector for joint rotation. Each UI control drives exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug)]
pub struct Joint {
    pub name: String,
    pub index: Index,
    pub parent_index: ParentIndex,
    pub depth: Depth,
    pub children: Vec<Index>,
    pub is_leaf: bool,
    pub endsite: Option<Endsite>,
}

/// Offset from a leaf joint's head to its tail. Only used to know the length of leaf bones.
#[derive(Debug)]
pub struct Endsite {
    pub offset: Position,
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// The skeleton of the loaded rig: the joint hierarchy plus a name lookup table
/// built once at load time, so by-name joint access is O(1) instead of a
/// hierarchy walk per UI event.
#[derive(Debug)]
pub struct RigMetadata {
    pub joints: Vec<Joint>,
    name_to_index: HashMap<String, Index>,
}

impl RigMetadata {
    pub fn new(joints: Vec<Joint>) -> Self {
        let name_to_index = joints
            .iter()
            .map(|joint| (joint.name.clone(), joint.index))
            .collect();
        RigMetadata {
            joints,
            name_to_index,
        }
    }

    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    /// Returns `None` for unknown names; mutating callers treat that as a no-op.
    pub fn find_joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.name_to_index.get(name).map(|&i| &self.joints[i])
    }

    pub fn find_joint_by_index(&self, index: Index) -> &Joint {
        &self.joints[index]
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Rest pose of the rig (frame invariant, "edit mode" in Blender terms). Indexed by joint index.
#[derive(Debug)]
pub struct RigData {
    pub rest_local_positions: Vec<Position>,
    pub rest_global_positions: Vec<Position>,
    pub rest_global_rotations: Vec<Quaternion>,
}
