//! Flipping bone chains and curves parented to a local referential
//!
//! These chains only support flipping. The first bone (or an offset node)
//! is positioned in the parent's space and flips like a point; later bones
//! are positioned relative to the previous one, and local curves always
//! flip their `offset.y` in the curve's own frame.

use crate::error::ApplyError;
use crate::host::AttributeReader;
use crate::rig::angle::projected_angle;
use crate::rig::types::{Attr, Axis, Fulcrum, NodeKind, Pref};

use super::stage::Stage;

pub(crate) fn plan_bone_curve<R: AttributeReader + ?Sized>(
    stage: &mut Stage<'_, R>,
    pref: &Pref,
) -> Result<(), ApplyError> {
    let along = pref.axis.position_attr();
    let mut first_bone = true;

    for index in 0..stage.chain().len() {
        match stage.kind(index) {
            NodeKind::Offset => {
                flip_rigid(stage, index, along, pref.axis == Axis::Horizontal, true, pref)?;
            }
            NodeKind::Bone => {
                let rotate180 = first_bone && pref.axis == Axis::Horizontal;
                flip_rigid(stage, index, along, rotate180, first_bone, pref)?;
                first_bone = false;
            }
            NodeKind::Curve => flip_local_curve(stage, index)?,
        }
    }
    Ok(())
}

/// Flip a bone or offset node.
///
/// With the offset fulcrum the chain pivots around its own root: the root
/// keeps its position and later bones get no position key at all.
fn flip_rigid<R: AttributeReader + ?Sized>(
    stage: &mut Stage<'_, R>,
    index: usize,
    along: Attr,
    rotate180: bool,
    is_root: bool,
    pref: &Pref,
) -> Result<(), ApplyError> {
    let across = match along {
        Attr::OffsetX => Attr::OffsetY,
        _ => Attr::OffsetX,
    };
    stage.pin(index, across)?;

    let position = stage.get(index, along)?;
    match pref.fulcrum {
        Fulcrum::Offset => {
            if is_root {
                stage.set(index, along, position);
            }
        }
        Fulcrum::Origin | Fulcrum::Centroid => stage.set(index, along, -position),
    }

    let orientation = stage.get(index, Attr::Orientation)?;
    stage.set(index, Attr::Orientation, projected_angle(orientation, rotate180));

    if stage.kind(index) == NodeKind::Bone {
        for attr in [Attr::Radius, Attr::Bias, Attr::Length] {
            stage.pin(index, attr)?;
        }
    }
    Ok(())
}

fn flip_local_curve<R: AttributeReader + ?Sized>(
    stage: &mut Stage<'_, R>,
    index: usize,
) -> Result<(), ApplyError> {
    stage.pin(index, Attr::OffsetX)?;
    for attr in [Attr::OffsetY, Attr::Orientation0, Attr::Orientation1] {
        let value = stage.get(index, attr)?;
        stage.set(index, attr, -value);
    }
    stage.pin(index, Attr::Length0)?;
    stage.pin(index, Attr::Length1)?;
    Ok(())
}
