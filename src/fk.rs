use crate::types::{Index, Position, Quaternion, RigData, RigMetadata};
use cgmath::Decomposed;

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Forward kinematics for one pose: compose each joint's local rotation with its
/// rest offset down the parent chain, yielding global positions and rotations.
///
/// Relies on the parse order invariant that parents precede their children.
pub fn global_pose(
    rig: &RigMetadata,
    data: &RigData,
    local_rotations: &[Quaternion],
) -> (Vec<Position>, Vec<Quaternion>) {
    let n = rig.num_joints();
    let mut positions = vec![Position::new(0.0, 0.0, 0.0); n];
    let mut rotations = vec![Quaternion::new(1.0, 0.0, 0.0, 0.0); n];

    for joint in rig.joints.iter() {
        let i = joint.index;
        let local = Decomposed {
            scale: 1.0,
            rot: local_rotations[i],
            disp: data.rest_local_positions[i],
        };

        let parent = if joint.parent_index == -1 {
            Decomposed {
                scale: 1.0,
                rot: Quaternion::new(1.0, 0.0, 0.0, 0.0),
                disp: Position::new(0.0, 0.0, 0.0),
            }
        } else {
            let p = joint.parent_index as Index;
            Decomposed {
                scale: 1.0,
                rot: rotations[p],
                disp: positions[p],
            }
        };

        let global = parent * local;
        positions[i] = global.disp;
        rotations[i] = global.rot;
    }

    (positions, rotations)
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Split the skeleton into chains of consecutive-depth joints, e.g.
/// \[\[0,1,2,3\],\[4,5,6\],...\] -- usually spine+head, each arm, each leg.
/// Used to draw the skeleton as line strips.
pub fn kinematic_chains(rig: &RigMetadata) -> Vec<Vec<Index>> {
    let mut chains: Vec<Vec<Index>> = Vec::new();
    let mut chain: Vec<Index> = Vec::new();
    let mut last_depth: isize = -1;
    for joint in rig.joints.iter() {
        if last_depth != joint.depth as isize - 1 {
            chains.push(chain.clone());
            chain.clear();
        }
        last_depth = joint.depth as isize;
        chain.push(joint.index);
    }
    chains.push(chain);
    chains.retain(|c| !c.is_empty());
    chains
}

/////////////////////////////////////////////////////////////////////////////////////////////////
