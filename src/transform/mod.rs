//! Transform engine
//!
//! Turns a [`Classification`] and a [`Pref`] into keyframes. Work happens in
//! two phases:
//!
//! 1. **Plan**: every value is read and computed against a staged overlay,
//!    producing a [`KeyframePlan`]. The host is never written.
//! 2. **Commit**: inside one undo transaction, channels are linked, cleared
//!    when resetting, keyed, and resting parameters are refreshed.
//!
//! A failed read therefore aborts before the first key is written.

mod bone_curve;
mod envelope;
mod stage;
mod swap;

pub use stage::KeyframeWrite;
pub use swap::apply_primal;

use std::fmt;

use log::{debug, info};

use crate::error::ApplyError;
use crate::host::{AttributeReader, AttributeWriter, Transaction, TransactionScope};
use crate::rig::chain::Classification;
use crate::rig::types::{Attr, Frame, NodeId, NodeKind, Operation, Pref, RESTING_FRAME};

use stage::Stage;

/// Undo label for envelope transformations
pub const ENVELOPE_LABEL: &str = "Flip-Symmetrize Deformation";

/// Undo label for bone and local curve flips
pub const BONE_CURVE_LABEL: &str = "Flip Curve and Bone Deformation";

/// Everything an Apply would write, computed without touching the host
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframePlan {
    pub operation: Operation,
    /// Undo transaction label
    pub label: &'static str,
    /// Frame every key is written at
    pub frame: Frame,
    /// At most one write per (node, attribute), in chain order
    pub writes: Vec<KeyframeWrite>,
    /// Clear every key on a written channel before keying
    pub clear_existing: bool,
    /// Nodes whose resting parameters are refreshed after keying
    pub resting_nodes: Vec<(NodeId, NodeKind)>,
    /// Twice the pivot coordinate along the reflection axis
    pub pivot_offset: f64,
}

impl KeyframePlan {
    /// Planned value for a node attribute, if any
    pub fn value_of(&self, node: &NodeId, attr: Attr) -> Option<f64> {
        self.writes
            .iter()
            .find(|w| &w.node == node && w.attr == attr)
            .map(|w| w.value)
    }
}

/// Summary of a committed Apply
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    pub operation: Operation,
    pub label: &'static str,
    pub frame: Frame,
    pub keys_written: usize,
    pub channels_cleared: usize,
    pub resting_nodes: usize,
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} keys at frame {} on {}",
            self.label, self.keys_written, self.frame, self.operation
        )?;
        if self.channels_cleared > 0 {
            write!(f, ", {} channels cleared", self.channels_cleared)?;
        }
        if self.resting_nodes > 0 {
            write!(f, ", {} resting nodes updated", self.resting_nodes)?;
        }
        Ok(())
    }
}

/// Compute the keyframes an Apply would write (dry run).
///
/// Values are read at `frame`. With `reset_to_resting` the keys target the
/// resting frame instead.
pub fn plan_transformation<R: AttributeReader + ?Sized>(
    reader: &R,
    classification: &Classification,
    pref: &Pref,
    frame: Frame,
) -> Result<KeyframePlan, ApplyError> {
    let operation = classification.operation;
    if !operation.is_applicable() {
        return Err(ApplyError::InvalidSelection(operation));
    }

    let chain = &classification.chain;
    let mut stage = Stage::new(reader, chain, frame);

    let (label, pivot_offset) = if operation.is_flip_only() {
        bone_curve::plan_bone_curve(&mut stage, pref)?;
        (BONE_CURVE_LABEL, 0.0)
    } else {
        let offset = envelope::plan_envelope(&mut stage, classification, pref)?;
        (ENVELOPE_LABEL, offset)
    };

    // Every resting copy must be readable before commit writes any key
    if pref.reset_to_resting {
        for index in 0..chain.len() {
            for attr in stage.kind(index).attributes() {
                stage.get(index, *attr)?;
            }
        }
    }

    let target = if pref.reset_to_resting {
        RESTING_FRAME
    } else {
        frame
    };
    let writes = stage.into_writes(target);
    let resting_nodes = if pref.reset_to_resting {
        chain
            .nodes()
            .iter()
            .map(|n| (n.id.clone(), n.kind))
            .collect()
    } else {
        Vec::new()
    };

    debug!(
        "planned {} keys for {} ({} mode, {} axis, {} fulcrum)",
        writes.len(),
        operation,
        pref.mode,
        pref.axis,
        pref.fulcrum
    );

    Ok(KeyframePlan {
        operation,
        label,
        frame: target,
        writes,
        clear_existing: pref.reset_to_resting,
        resting_nodes,
        pivot_offset,
    })
}

/// Plan and commit a transformation as one undo step
pub fn apply_transformation<H>(
    host: &mut H,
    classification: &Classification,
    pref: &Pref,
    frame: Frame,
) -> Result<ApplyReport, ApplyError>
where
    H: AttributeReader + AttributeWriter + TransactionScope + ?Sized,
{
    let plan = plan_transformation(&*host, classification, pref, frame)?;
    commit(host, &plan)
}

/// Write a plan to the host inside one transaction
pub fn commit<H>(host: &mut H, plan: &KeyframePlan) -> Result<ApplyReport, ApplyError>
where
    H: AttributeWriter + TransactionScope + ?Sized,
{
    let mut tx = Transaction::begin(host, plan.label);

    let channels = plan
        .writes
        .iter()
        .map(|w| tx.ensure_channel(&w.node, w.attr))
        .collect::<Result<Vec<_>, _>>()?;

    let mut channels_cleared = 0;
    if plan.clear_existing {
        for channel in &channels {
            tx.clear_all_keyframes(channel)?;
            channels_cleared += 1;
        }
    }

    for (write, channel) in plan.writes.iter().zip(&channels) {
        tx.write_keyframe(channel, write.frame, write.value)?;
    }

    for (id, kind) in &plan.resting_nodes {
        for attr in kind.attributes() {
            tx.copy_to_resting(id, *attr, RESTING_FRAME)?;
        }
    }

    info!(
        "{}: wrote {} keys on {} ({} resting nodes)",
        plan.label,
        plan.writes.len(),
        plan.operation,
        plan.resting_nodes.len()
    );

    Ok(ApplyReport {
        operation: plan.operation,
        label: plan.label,
        frame: plan.frame,
        keys_written: plan.writes.len(),
        channels_cleared,
        resting_nodes: plan.resting_nodes.len(),
    })
}
