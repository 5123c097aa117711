//! Exchanging values between mirror partners
//!
//! A curve point's handles live on two nodes: the outgoing handle
//! (`orientation0`, `length0`) on the next curve, the incoming handle
//! (`orientation1`, `length1`) on the point's own curve. Offset nodes carry
//! no handles, so their incoming handle is read from the node before them.

use crate::error::ApplyError;
use crate::host::AttributeReader;
use crate::rig::angle::reflect_handle;
use crate::rig::types::{ApplyTo, Attr, Axis, Mode, NodeKind, Pref};
use crate::rig::wings::{ShapeOrientation, Wing};

use super::stage::Stage;

/// Whether wing 0 (the primal side) is the authority for a symmetrize.
///
/// The authority is whichever wing sits on the side that is *not* being
/// overwritten: left/right decides on the horizontal axis, bottom/top on
/// the vertical one.
pub fn apply_primal(apply_to: ApplyTo, orientation: &ShapeOrientation, axis: Axis) -> bool {
    let facing = match axis {
        Axis::Horizontal => orientation.left_wing,
        Axis::Vertical => orientation.bottom_wing,
    };
    matches!(
        (facing, apply_to),
        (Wing::Wing0, ApplyTo::TopRight) | (Wing::Wing1, ApplyTo::BottomLeft)
    )
}

/// Per-Apply settings shared by every swap
#[derive(Debug, Clone, Copy)]
pub(crate) struct SwapContext {
    pub axis: Axis,
    pub mode: Mode,
    /// Write wing 1 from wing 0
    pub primal: bool,
    /// Write wing 0 from wing 1
    pub opposite: bool,
    pub open_envelope: bool,
}

impl SwapContext {
    pub fn new(pref: &Pref, orientation: &ShapeOrientation, open_envelope: bool) -> Self {
        let (primal, opposite) = match pref.mode {
            Mode::Symmetrize => {
                let primal = apply_primal(pref.apply_to, orientation, pref.axis);
                (primal, !primal)
            }
            Mode::Mirror | Mode::Flip => (true, true),
        };
        Self {
            axis: pref.axis,
            mode: pref.mode,
            primal,
            opposite,
            open_envelope,
        }
    }

    fn rotate180(&self) -> bool {
        self.axis == Axis::Horizontal
    }
}

/// Node holding the incoming handle of the point at `index`
fn incoming<R: AttributeReader + ?Sized>(
    stage: &Stage<'_, R>,
    index: usize,
) -> Result<usize, ApplyError> {
    match stage.kind(index) {
        NodeKind::Offset => stage.chain().predecessor(index),
        _ => Ok(index),
    }
}

/// Write each point of a mirror pair from its partner's reflection
pub(crate) fn swap_points<R: AttributeReader + ?Sized>(
    stage: &mut Stage<'_, R>,
    prime: usize,
    opp: usize,
    ctx: &SwapContext,
) -> Result<(), ApplyError> {
    let along = ctx.axis.position_attr();
    let across = ctx.axis.cross_attr();
    let rotate180 = ctx.rotate180();

    let prime_along = stage.get(prime, along)?;
    let prime_across = stage.get(prime, across)?;
    let opp_along = stage.get(opp, along)?;
    let opp_across = stage.get(opp, across)?;

    if ctx.primal {
        stage.set(opp, along, -prime_along);
        stage.set(opp, across, prime_across);
    } else {
        stage.set(opp, along, opp_along);
        stage.set(opp, across, opp_across);
    }
    if ctx.opposite {
        stage.set(prime, along, -opp_along);
        stage.set(prime, across, opp_across);
    } else {
        stage.set(prime, along, prime_along);
        stage.set(prime, across, prime_across);
    }

    let prime0 = stage.chain().successor(prime)?;

    // End points of an open envelope: the head has no incoming handle and
    // the tail no outgoing one, so only those two handles trade places.
    if ctx.mode == Mode::Symmetrize && ctx.open_envelope && stage.kind(prime) == NodeKind::Offset
    {
        let opp1 = opp;
        let prime_o0 = stage.get(prime0, Attr::Orientation0)?;
        let prime_l0 = stage.get(prime0, Attr::Length0)?;
        let opp_o1 = stage.get(opp1, Attr::Orientation1)?;
        let opp_l1 = stage.get(opp1, Attr::Length1)?;

        if ctx.primal {
            stage.set(opp1, Attr::Orientation1, reflect_handle(opp_o1, prime_o0, rotate180));
            stage.set(opp1, Attr::Length1, prime_l0);
            stage.set(prime0, Attr::Orientation0, prime_o0);
            stage.set(prime0, Attr::Length0, prime_l0);
        } else {
            stage.set(prime0, Attr::Orientation0, reflect_handle(prime_o0, opp_o1, rotate180));
            stage.set(prime0, Attr::Length0, opp_l1);
            stage.set(opp1, Attr::Orientation1, opp_o1);
            stage.set(opp1, Attr::Length1, opp_l1);
        }
        return Ok(());
    }

    let prime1 = incoming(stage, prime)?;
    let opp0 = stage.chain().successor(opp)?;
    let opp1 = incoming(stage, opp)?;

    let prime_o0 = stage.get(prime0, Attr::Orientation0)?;
    let prime_o1 = stage.get(prime1, Attr::Orientation1)?;
    let prime_l0 = stage.get(prime0, Attr::Length0)?;
    let prime_l1 = stage.get(prime1, Attr::Length1)?;
    let opp_o0 = stage.get(opp0, Attr::Orientation0)?;
    let opp_o1 = stage.get(opp1, Attr::Orientation1)?;
    let opp_l0 = stage.get(opp0, Attr::Length0)?;
    let opp_l1 = stage.get(opp1, Attr::Length1)?;

    // Outgoing and incoming trade places: a reflected outgoing handle
    // becomes the partner's incoming handle.
    if ctx.primal {
        stage.set(opp0, Attr::Orientation0, reflect_handle(opp_o0, prime_o1, rotate180));
        stage.set(opp1, Attr::Orientation1, reflect_handle(opp_o1, prime_o0, rotate180));
        stage.set(opp0, Attr::Length0, prime_l1);
        stage.set(opp1, Attr::Length1, prime_l0);
    } else {
        stage.set(opp0, Attr::Orientation0, opp_o0);
        stage.set(opp1, Attr::Orientation1, opp_o1);
        stage.set(opp0, Attr::Length0, opp_l0);
        stage.set(opp1, Attr::Length1, opp_l1);
    }

    if ctx.opposite {
        stage.set(prime0, Attr::Orientation0, reflect_handle(prime_o0, opp_o1, rotate180));
        stage.set(prime1, Attr::Orientation1, reflect_handle(prime_o1, opp_o0, rotate180));
        stage.set(prime0, Attr::Length0, opp_l1);
        stage.set(prime1, Attr::Length1, opp_l0);
    } else {
        stage.set(prime0, Attr::Orientation0, prime_o0);
        stage.set(prime1, Attr::Orientation1, prime_o1);
        stage.set(prime0, Attr::Length0, prime_l0);
        stage.set(prime1, Attr::Length1, prime_l1);
    }

    Ok(())
}

/// Reflect a point lying on the symmetry line onto itself.
///
/// The point's two handles mirror each other. Under symmetrize the point is
/// snapped onto the line and only one handle is rewritten; if the outgoing
/// handle belongs to wing 1 the roles of the two handles are exchanged.
pub(crate) fn swap_self_handles<R: AttributeReader + ?Sized>(
    stage: &mut Stage<'_, R>,
    index: usize,
    wing1: &[usize],
    ctx: &SwapContext,
) -> Result<(), ApplyError> {
    let along = ctx.axis.position_attr();
    let rotate180 = ctx.rotate180();

    let position = stage.get(index, along)?;
    let target = match ctx.mode {
        Mode::Symmetrize => 0.0,
        Mode::Mirror | Mode::Flip => -position,
    };
    stage.set(index, along, target);
    stage.pin(index, ctx.axis.cross_attr())?;
    if stage.kind(index) == NodeKind::Offset {
        stage.pin(index, Attr::Orientation)?;
    }

    let next = stage.chain().successor(index)?;
    let own = incoming(stage, index)?;

    let next_in_wing1 = wing1.iter().any(|&w| {
        w == next
            || (stage.kind(w) == NodeKind::Offset
                && stage.chain().node(w).predecessor == Some(next))
    });
    let swapped = ctx.mode == Mode::Symmetrize && next_in_wing1;

    let (h0, o0_attr, l0_attr, h1, o1_attr, l1_attr) = if swapped {
        (own, Attr::Orientation1, Attr::Length1, next, Attr::Orientation0, Attr::Length0)
    } else {
        (next, Attr::Orientation0, Attr::Length0, own, Attr::Orientation1, Attr::Length1)
    };

    let o0 = stage.get(h0, o0_attr)?;
    let o1 = stage.get(h1, o1_attr)?;
    let l0 = stage.get(h0, l0_attr)?;
    let l1 = stage.get(h1, l1_attr)?;

    if ctx.opposite {
        stage.set(h0, o0_attr, reflect_handle(o0, o1, rotate180));
        stage.set(h0, l0_attr, l1);
    } else {
        stage.set(h0, o0_attr, o0);
        stage.set(h0, l0_attr, l0);
    }

    if ctx.primal {
        stage.set(h1, o1_attr, reflect_handle(o1, o0, rotate180));
        stage.set(h1, l1_attr, l0);
    } else {
        stage.set(h1, o1_attr, o1);
        stage.set(h1, l1_attr, l1);
    }

    Ok(())
}
