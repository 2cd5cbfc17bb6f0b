use crate::types::*;
use cgmath::{InnerSpace, Rad, Rotation3, Zero};
use regex::Regex;
use thiserror::Error;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Error)]
pub enum RigError {
    #[error("failed to read rig file: {0}")]
    Io(#[from] std::io::Error),
    #[error("rig syntax error at line {line}: {msg}")]
    Syntax { line: usize, msg: String },
    #[error("rig file contains no joints")]
    Empty,
}

fn syntax(line: usize, msg: impl Into<String>) -> RigError {
    RigError::Syntax {
        line: line + 1, // 1-based for humans
        msg: msg.into(),
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Used during joint creation to fill in its parent index: searches backwards for the
/// joint with depth 1 less than the current joint's depth.
fn __find_parent_joint_index_by_depth(joint_depth: Depth, joints: &[Joint]) -> Option<ParentIndex> {
    // root joint
    if joints.is_empty() {
        return Some(-1);
    }
    let mut i = joints.len() as isize - 1;
    while i >= 0 {
        if joints[i as Index].depth + 1 == joint_depth {
            return Some(i);
        }
        i -= 1;
    }
    None
}

/// Get the tail offset of a joint (the vector pointing from the joint's head to its tail
/// in rest pose). Used to derive the joint's rest pose rotation.
fn __get_tail_offset(joint: &Joint, offsets: &[Position]) -> Position {
    let num_children = joint.children.len();

    if num_children == 1 {
        offsets[joint.children[0]]
    } else if num_children > 1 {
        // average of all children's offsets; this is what makes the rotation of the hips
        // and the highest spine joint come out right
        joint
            .children
            .iter()
            .map(|&child_index| offsets[child_index])
            .sum::<Position>()
            / num_children as f64
    } else if let Some(endsite) = &joint.endsite {
        endsite.offset
    } else {
        // childless joint without an endsite; any direction works, point it up
        Position::new(0.0, 1.0, 0.0)
    }
}

/// Fill in the global rest pose of every joint: positions accumulate along the parent
/// chain, rotations are derived from the direction each bone points in rest pose.
fn __calc_rest_pose(rig: &RigMetadata, data: &mut RigData) {
    for joint in rig.joints.iter() {
        data.rest_global_positions[joint.index] = if joint.parent_index != -1 {
            data.rest_local_positions[joint.index]
                + data.rest_global_positions[joint.parent_index as Index]
        } else {
            data.rest_local_positions[joint.index]
        };

        // .bvh files don't carry rest orientations, so compute the rotation that takes
        // the Y axis onto the bone's tail direction
        let tail_offset = __get_tail_offset(joint, &data.rest_local_positions);
        let dir = if tail_offset != Position::zero() {
            tail_offset.normalize()
        } else {
            Position::new(0.0, 1.0, 0.0) // prevent NaNs in case of zero offset joints
        };
        let axs = Position::new(0.0, 1.0, 0.0);
        let dot = dir.dot(axs);
        data.rest_global_rotations[joint.index] = if dot < -0.9999 {
            Quaternion::new(0.0, 0.0, 0.0, 1.0)
        } else if dot > 0.9999 {
            Quaternion::new(1.0, 0.0, 0.0, 0.0)
        } else {
            let angle = dot.acos();
            let axis = axs.cross(dir).normalize();
            Quaternion::from_axis_angle(axis, Rad(angle))
        };
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Parse the HIERARCHY section of a .bvh file into a rig. Any MOTION section is
/// ignored: animation in this crate comes from captured poses, not from the file.
fn parse_rig(text: &str) -> Result<(RigMetadata, RigData), RigError> {
    let mut joints: Vec<Joint> = Vec::new();
    let mut rest_local_positions: Vec<Position> = Vec::new();

    let mut parsing_endsite = false;
    let mut depth: Depth = 0;

    let re_joint = Regex::new(r"(ROOT|JOINT)\s+(\w+)").unwrap();
    let re_offset = Regex::new(r"OFFSET\s+(.+)").unwrap();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();

        if line.starts_with("HIERARCHY") || line.is_empty() {
            continue;
        } else if line.starts_with("ROOT") || line.starts_with("JOINT") {
            let captures = re_joint
                .captures(line)
                .ok_or_else(|| syntax(line_no, "joint declaration without a name"))?;
            let name = captures.get(2).unwrap().as_str().to_string();
            let joint_index = joints.len() as Index;
            let parent_index = __find_parent_joint_index_by_depth(depth, &joints)
                .ok_or_else(|| syntax(line_no, "joint has no parent at the enclosing depth"))?;
            let joint = Joint {
                name,
                index: joint_index,
                parent_index,
                depth,
                children: Vec::new(),
                is_leaf: false,
                endsite: None,
            };

            //// if the joint has a parent, register it in the parent's children
            if joint.parent_index != -1 {
                if let Some(parent) = joints.get_mut(joint.parent_index as Index) {
                    parent.children.push(joint.index);
                }
            }
            joints.push(joint);
        } else if line.to_lowercase().starts_with("end") {
            parsing_endsite = true;
        } else if line == "{" {
            depth += 1;
        } else if line == "}" {
            if depth == 0 {
                return Err(syntax(line_no, "unbalanced closing brace"));
            }
            depth -= 1;
        } else if line.starts_with("OFFSET") {
            let captures = re_offset
                .captures(line)
                .ok_or_else(|| syntax(line_no, "OFFSET without values"))?;
            let offset: Vec<f64> = captures
                .get(1)
                .unwrap()
                .as_str()
                .split_whitespace()
                .map(|s| s.parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|e| syntax(line_no, format!("bad OFFSET value: {e}")))?;
            if offset.len() != 3 {
                return Err(syntax(line_no, "OFFSET needs exactly 3 values"));
            }
            let offset = Position::new(offset[0], offset[1], offset[2]);

            if let Some(joint) = joints.last_mut() {
                if parsing_endsite {
                    joint.endsite = Some(Endsite { offset });
                    joint.is_leaf = true;
                    parsing_endsite = false;
                } else {
                    rest_local_positions.push(offset);
                }
            } else {
                return Err(syntax(line_no, "OFFSET before any joint"));
            }
        } else if line.starts_with("CHANNELS") {
            // channel layout only matters for MOTION data, which we don't read
            continue;
        } else if line.starts_with("MOTION") {
            break;
        }
    }

    if joints.is_empty() {
        return Err(RigError::Empty);
    }
    if rest_local_positions.len() != joints.len() {
        return Err(RigError::Syntax {
            line: 0,
            msg: format!(
                "{} joints but {} offsets",
                joints.len(),
                rest_local_positions.len()
            ),
        });
    }

    let num_joints = joints.len();
    let rig = RigMetadata::new(joints);
    let mut data = RigData {
        rest_local_positions,
        rest_global_positions: vec![Position::zero(); num_joints],
        rest_global_rotations: vec![Quaternion::new(1.0, 0.0, 0.0, 0.0); num_joints],
    };
    __calc_rest_pose(&rig, &mut data);

    Ok((rig, data))
}

//////////////////////////////////////////////////////////////// PUBLIC ////////////////////////////////////////////////////////////////////////////////

/// Load a rig from a .bvh file path.
pub fn load_rig_from_file(file_path: &str) -> Result<(RigMetadata, RigData), RigError> {
    let contents = std::fs::read_to_string(file_path)?;
    parse_rig(&contents)
}

/// Load a rig from .bvh text.
pub fn load_rig_from_string(text: &str) -> Result<(RigMetadata, RigData), RigError> {
    parse_rig(text)
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
