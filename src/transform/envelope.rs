//! Open and closed envelope transformations

use log::debug;

use crate::error::ApplyError;
use crate::host::AttributeReader;
use crate::rig::angle::{projected_angle, reflect_handle};
use crate::rig::chain::Classification;
use crate::rig::pivot::resolve_offset;
use crate::rig::types::{Attr, Axis, Fulcrum, Mode, NodeKind, Operation, Pref};
use crate::rig::wings::{partition_closed, partition_open, resolve_orientation};

use super::stage::Stage;
use super::swap::{swap_points, swap_self_handles, SwapContext};

/// Plan an envelope transformation; returns the resolved pivot offset
pub(crate) fn plan_envelope<R: AttributeReader + ?Sized>(
    stage: &mut Stage<'_, R>,
    classification: &Classification,
    pref: &Pref,
) -> Result<f64, ApplyError> {
    let len = stage.chain().len();
    let closed = classification.operation == Operation::ClosedEnvelope;
    let along = pref.axis.position_attr();

    let positions = stage.positions()?;
    let offset = resolve_offset(
        &positions,
        classification.operation,
        &classification.anchors,
        pref,
    );
    let shifted = pref.fulcrum != Fulcrum::Origin;

    if pref.mode == Mode::Flip {
        flip_envelope(stage, pref.axis)?;
    } else {
        let partition = if closed {
            partition_closed(len, &classification.anchors)?
        } else {
            partition_open(len)
        };
        let orientation = resolve_orientation(&positions, &partition, stage.aspect_ratio());
        debug!("shape orientation: {:?}", orientation);

        // Work around the pivot as if it were the origin
        if shifted {
            for index in 0..len {
                stage.shift(index, along, -offset / 2.0)?;
            }
        }

        let ctx = SwapContext::new(pref, &orientation, !closed);
        if closed {
            if let [anchor] = classification.anchors.as_slice() {
                swap_self_handles(stage, *anchor, &partition.wing1, &ctx)?;
            }
            if let Some(remainder) = partition.remainder {
                swap_self_handles(stage, remainder, &partition.wing1, &ctx)?;
            }
            for (prime, opp) in partition.pairs() {
                swap_points(stage, prime, opp, &ctx)?;
            }
        } else if pref.mode == Mode::Mirror && orientation.vector != pref.axis {
            // Mirroring across the shape's short side: nothing to trade
            flip_envelope(stage, pref.axis)?;
        } else {
            for (prime, opp) in partition.pairs() {
                swap_points(stage, prime, opp, &ctx)?;
            }
            if let Some(remainder) = partition.remainder {
                swap_self_handles(stage, remainder, &partition.wing1, &ctx)?;
            }
        }
    }

    if shifted {
        let back = match pref.mode {
            Mode::Flip => offset,
            Mode::Mirror | Mode::Symmetrize => offset / 2.0,
        };
        for index in 0..len {
            stage.shift(index, along, back)?;
        }
    }

    Ok(offset)
}

/// Reflect every node of the chain in place
pub(crate) fn flip_envelope<R: AttributeReader + ?Sized>(
    stage: &mut Stage<'_, R>,
    axis: Axis,
) -> Result<(), ApplyError> {
    let along = axis.position_attr();
    let rotate180 = axis == Axis::Vertical;

    for index in 0..stage.chain().len() {
        let position = stage.get(index, along)?;
        stage.set(index, along, -position);
        stage.pin(index, axis.cross_attr())?;

        match stage.kind(index) {
            NodeKind::Curve => {
                for (orientation, length) in [
                    (Attr::Orientation0, Attr::Length0),
                    (Attr::Orientation1, Attr::Length1),
                ] {
                    let value = stage.get(index, orientation)?;
                    stage.set(index, orientation, reflect_handle(value, value, rotate180));
                    stage.pin(index, length)?;
                }
            }
            NodeKind::Offset | NodeKind::Bone => {
                let value = stage.get(index, Attr::Orientation)?;
                stage.set(index, Attr::Orientation, projected_angle(value, rotate180));
            }
        }
    }
    Ok(())
}
