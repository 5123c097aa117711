//! Partitioning a chain into symmetric wings
//!
//! A wing is the run of nodes on one side of the symmetry line. Wings are
//! stored partner-aligned: `wing1[i]` is the node `wing0[i]` is mirrored
//! onto. An odd node count leaves one unpaired remainder on the line.
//!
//! ## Open chains
//!
//! Pairs are taken from both ends inward: `0 <-> N-1`, `1 <-> N-2`, ...
//!
//! ## Closed envelopes
//!
//! The last node is the joint closing the path onto the first point, so it
//! never pairs. The walk starts next to the selected anchor and runs around
//! the ring with wrapped indices, filling wing 0, the remainder, then wing 1.

use log::debug;

use crate::error::ApplyError;

use super::types::{Axis, Point};

/// Label of one side of a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wing {
    Wing0,
    Wing1,
}

/// Two partner-aligned wings and the optional unpaired middle node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WingPartition {
    pub wing0: Vec<usize>,
    pub wing1: Vec<usize>,
    pub remainder: Option<usize>,
}

impl WingPartition {
    /// Mirror pairs `(wing0[i], wing1[i])`
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.wing0.iter().copied().zip(self.wing1.iter().copied())
    }
}

/// Split an open chain of `len` nodes from both ends inward
pub fn partition_open(len: usize) -> WingPartition {
    let pairs = len / 2;
    WingPartition {
        wing0: (0..pairs).collect(),
        wing1: (len - pairs..len).rev().collect(),
        remainder: (len % 2 == 1).then_some(pairs),
    }
}

/// Split a closed envelope of `len` nodes (joint last) around its anchors.
///
/// With one anchor the anchor sits on the symmetry line and is left out of
/// both wings. With two anchors the line runs between them: the first opens
/// wing 0 and the second closes wing 1, so the second must be the ring
/// neighbour just before the first.
pub fn partition_closed(len: usize, anchors: &[usize]) -> Result<WingPartition, ApplyError> {
    let Some(joint) = len.checked_sub(1) else {
        return Err(ApplyError::invalid_anchors("the envelope has no nodes"));
    };
    let Some((&first, rest)) = anchors.split_first() else {
        return Err(ApplyError::invalid_anchors("no point selected on the envelope"));
    };
    if anchors.iter().any(|&a| a >= joint) {
        return Err(ApplyError::invalid_anchors(
            "the closing joint cannot mark the line of symmetry",
        ));
    }
    let second = rest.first().copied();

    // Ring of points without the joint
    let ring = joint;
    if let Some(second) = second {
        if (first + ring - 1) % ring != second {
            return Err(ApplyError::invalid_anchors(format!(
                "points {} and {} are not neighbours; select the two points the line passes between",
                first, second
            )));
        }
    }

    let mut taken = vec![false; len];
    taken[joint] = true;
    let excluded = match second {
        None => {
            taken[first] = true;
            2
        }
        Some(_) => 1,
    };
    let common = len - excluded;
    let max = common / 2;
    let needs_remainder = common % 2 == 1;

    let start = match second {
        None => first + 1,
        Some(second) => {
            taken[second] = true;
            first
        }
    };

    let mut wing0 = Vec::with_capacity(max);
    let mut wing1 = Vec::with_capacity(max);
    let mut remainder = None;
    // The second anchor always closes wing 1
    let reserved = usize::from(second.is_some());

    for step in 0..len {
        let index = (start + step) % len;
        if taken[index] {
            continue;
        }

        if wing0.len() < max {
            wing0.push(index);
        } else if needs_remainder && remainder.is_none() {
            remainder = Some(index);
        } else if wing1.len() + reserved < max {
            wing1.push(index);
        } else {
            break;
        }
        taken[index] = true;
    }
    if let Some(second) = second {
        if wing1.len() < max {
            wing1.push(second);
        }
    }

    if wing0.len() != max || wing1.len() != max {
        return Err(ApplyError::invalid_anchors(format!(
            "uneven partition ({} and {} points on each side)",
            wing0.len(),
            wing1.len()
        )));
    }

    // Walk order runs away from wing 0; partners are in reverse
    wing1.reverse();
    debug!(
        "closed partition: wing0 {:?}, wing1 {:?}, remainder {:?}",
        wing0, wing1, remainder
    );

    Ok(WingPartition {
        wing0,
        wing1,
        remainder,
    })
}

/// Where the wings sit on screen and which way the shape spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeOrientation {
    pub bottom_wing: Wing,
    pub left_wing: Wing,
    /// Axis along which the points spread the most
    pub vector: Axis,
}

/// Locate the wings and the dominant spread of a shape.
///
/// `positions` holds every chain node's offset; y values are scaled by the
/// scene's `aspect` ratio before comparing.
pub fn resolve_orientation(
    positions: &[Point],
    partition: &WingPartition,
    aspect: f64,
) -> ShapeOrientation {
    let total = |wing: &[usize]| {
        let sum = wing.iter().fold(Point::default(), |acc, &i| {
            Point::new(acc.x + positions[i].x, acc.y + positions[i].y)
        });
        Point::new(sum.x, sum.y * aspect)
    };
    let wing0 = total(&partition.wing0);
    let wing1 = total(&partition.wing1);

    let left_wing = if wing0.x > wing1.x {
        Wing::Wing1
    } else {
        Wing::Wing0
    };
    let bottom_wing = if wing0.y > wing1.y {
        Wing::Wing1
    } else {
        Wing::Wing0
    };

    let count = positions.len() as f64;
    let cx = positions.iter().map(|p| p.x).sum::<f64>() / count;
    let cy = positions.iter().map(|p| p.y).sum::<f64>() / count;
    let spread_x: f64 = positions.iter().map(|p| (cx - p.x).abs()).sum();
    let spread_y = positions.iter().map(|p| (cy - p.y).abs()).sum::<f64>() * aspect;

    let vector = if spread_x < spread_y {
        Axis::Vertical
    } else {
        Axis::Horizontal
    };

    ShapeOrientation {
        bottom_wing,
        left_wing,
        vector,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_open_even() {
        let p = partition_open(4);
        assert_eq!(p.wing0, vec![0, 1]);
        assert_eq!(p.wing1, vec![3, 2]);
        assert_eq!(p.remainder, None);
        assert_eq!(p.pairs().collect::<Vec<_>>(), vec![(0, 3), (1, 2)]);
    }

    #[test]
    fn test_open_odd() {
        let p = partition_open(5);
        assert_eq!(p.wing0, vec![0, 1]);
        assert_eq!(p.wing1, vec![4, 3]);
        assert_eq!(p.remainder, Some(2));
    }

    #[test]
    fn test_open_single_node() {
        let p = partition_open(1);
        assert!(p.wing0.is_empty());
        assert!(p.wing1.is_empty());
        assert_eq!(p.remainder, Some(0));
    }

    #[test]
    fn test_closed_single_anchor_wraps() {
        // 8 points + joint, anchor at 3
        let p = partition_closed(9, &[3]).unwrap();
        assert_eq!(p.wing0, vec![4, 5, 6]);
        assert_eq!(p.remainder, Some(7));
        assert_eq!(p.wing1, vec![2, 1, 0]);
    }

    #[test]
    fn test_closed_single_anchor_even_common() {
        // 7 points + joint, anchor at 3: line through 3 and between 6|0
        let p = partition_closed(8, &[3]).unwrap();
        assert_eq!(p.pairs().collect::<Vec<_>>(), vec![(4, 2), (5, 1), (6, 0)]);
        assert_eq!(p.remainder, None);
    }

    #[test]
    fn test_closed_two_adjacent_anchors() {
        // 8 points + joint, line between 2 and 3
        let p = partition_closed(9, &[3, 2]).unwrap();
        assert_eq!(p.wing0, vec![3, 4, 5, 6]);
        assert_eq!(p.wing1, vec![2, 1, 0, 7]);
        assert_eq!(p.remainder, None);
    }

    #[test]
    fn test_closed_two_anchors_across_joint() {
        // Points 0 and 7 are neighbours through the joint
        let p = partition_closed(9, &[0, 7]).unwrap();
        assert_eq!(
            p.pairs().collect::<Vec<_>>(),
            vec![(0, 7), (1, 6), (2, 5), (3, 4)]
        );
    }

    #[test]
    fn test_closed_two_anchors_with_remainder() {
        // 7 points + joint, line between 2|3 and through 6
        let p = partition_closed(8, &[3, 2]).unwrap();
        assert_eq!(p.pairs().collect::<Vec<_>>(), vec![(3, 2), (4, 1), (5, 0)]);
        assert_eq!(p.remainder, Some(6));
    }

    #[test]
    fn test_closed_smallest_ring_keeps_remainder() {
        // 2 points + joint: the walk from anchor 1 meets the joint first
        let p = partition_closed(3, &[1]).unwrap();
        assert!(p.wing0.is_empty());
        assert!(p.wing1.is_empty());
        assert_eq!(p.remainder, Some(0));
    }

    #[test]
    fn test_closed_rejects_distant_anchors() {
        let err = partition_closed(9, &[1, 5]).unwrap_err();
        assert!(matches!(err, ApplyError::InvalidAnchors { .. }));
    }

    #[test]
    fn test_closed_rejects_joint_anchor() {
        assert!(partition_closed(9, &[8]).is_err());
    }

    #[test]
    fn test_closed_requires_anchor() {
        assert!(partition_closed(9, &[]).is_err());
    }

    #[test]
    fn test_orientation_left_and_bottom() {
        let positions = [
            Point::new(-10.0, -2.0),
            Point::new(-4.0, -1.0),
            Point::new(4.0, 1.0),
            Point::new(10.0, 2.0),
        ];
        let o = resolve_orientation(&positions, &partition_open(4), 1.0);
        assert_eq!(o.left_wing, Wing::Wing0);
        assert_eq!(o.bottom_wing, Wing::Wing0);
        assert_eq!(o.vector, Axis::Horizontal);
    }

    #[test]
    fn test_orientation_vertical_spread() {
        let positions = [
            Point::new(1.0, 10.0),
            Point::new(0.0, 4.0),
            Point::new(0.0, -4.0),
            Point::new(1.0, -10.0),
        ];
        let o = resolve_orientation(&positions, &partition_open(4), 1.0);
        assert_eq!(o.bottom_wing, Wing::Wing1);
        assert_eq!(o.vector, Axis::Vertical);
    }

    #[test]
    fn test_orientation_aspect_scales_y() {
        // Spread 8 in x, 6 in y; a 2:1 aspect makes y dominant
        let positions = [Point::new(-2.0, -1.5), Point::new(2.0, 1.5)];
        let p = partition_open(2);
        assert_eq!(resolve_orientation(&positions, &p, 1.0).vector, Axis::Horizontal);
        assert_eq!(resolve_orientation(&positions, &p, 2.0).vector, Axis::Vertical);
    }
}
