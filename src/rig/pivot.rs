//! Pivot offset for the three fulcrum policies
//!
//! The returned offset is twice the pivot coordinate along the reflection
//! axis. Reflecting `v` around the pivot is then `offset - v`.

use log::debug;

use super::types::{Fulcrum, Operation, Point, Pref};

/// Offset along `pref.axis` the chain is reflected around.
///
/// `positions` holds every chain node's offset, joint last. `anchors` are the
/// selected chain indices, only consulted for closed envelopes.
pub fn resolve_offset(
    positions: &[Point],
    operation: Operation,
    anchors: &[usize],
    pref: &Pref,
) -> f64 {
    let along = |index: usize| pref.axis.component(positions[index]);

    let offset = match (operation, pref.fulcrum) {
        (Operation::Bone | Operation::Curve, _) => 0.0,
        (_, Fulcrum::Origin) => 0.0,

        (Operation::ClosedEnvelope, Fulcrum::Offset) => doubled_or_summed(anchors, along),
        (_, Fulcrum::Offset) => {
            let len = positions.len();
            if len == 0 {
                0.0
            } else if len % 2 == 1 {
                along(len / 2) * 2.0
            } else {
                along(len / 2) + along(len / 2 - 1)
            }
        }

        (_, Fulcrum::Centroid) => {
            let count = if operation == Operation::ClosedEnvelope {
                positions.len().saturating_sub(1)
            } else {
                positions.len()
            };
            let values = (0..count).map(along);
            let min = values.clone().fold(f64::INFINITY, f64::min);
            let max = values.fold(f64::NEG_INFINITY, f64::max);
            if count == 0 {
                0.0
            } else {
                min + max
            }
        }
    };

    debug!(
        "{} fulcrum on {} axis resolves to offset {}",
        pref.fulcrum, pref.axis, offset
    );
    offset
}

fn doubled_or_summed(indices: &[usize], along: impl Fn(usize) -> f64) -> f64 {
    match indices {
        [] => 0.0,
        [single] => along(*single) * 2.0,
        [first, second, ..] => along(*first) + along(*second),
    }
}
