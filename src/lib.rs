//! rig-symmetry - Mirror, flip and symmetrize 2D deformer rigs
//!
//! This library reconstructs a deformer chain (bones, curves, envelope
//! offsets) from a selected node, splits it into symmetric wings around a
//! pivot, and keys the mirrored, flipped or symmetrized pose back into the
//! host's animation channels.
//!
//! The host is reached only through the traits in [`host`]; [`MemoryScene`]
//! implements all of them over a TOML scene document.
//!
//! # Example
//!
//! ```rust
//! use rig_symmetry::{classify, plan_transformation, Attr, MemoryScene, Mode, NodeId, Pref};
//!
//! let scene = MemoryScene::from_str(r#"
//! selection = ["Top/Offset"]
//!
//! [[node]]
//! id = "Top/Offset"
//! type = "OffsetModule"
//! parent = "Top"
//! attrs = { "offset.x" = 3.0, "offset.y" = 1.0, orientation = 0.0 }
//!
//! [[node]]
//! id = "Top/Curve"
//! type = "CurveModule"
//! parent = "Top"
//! source = "Top/Offset"
//! attrs = { "offset.x" = 5.0, "offset.y" = 1.0, orientation0 = 0.0, length0 = 1.0, orientation1 = 0.0, length1 = 1.0 }
//! "#).unwrap();
//!
//! let classification = classify(&scene);
//! let pref = Pref::new().with_mode(Mode::Flip);
//! let plan = plan_transformation(&scene, &classification, &pref, 1).unwrap();
//!
//! assert_eq!(plan.value_of(&NodeId::from("Top/Curve"), Attr::OffsetX), Some(-5.0));
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod rig;
pub mod scene;
pub mod session;
pub mod transform;

pub use config::{Preferences, PreferencesError};
pub use error::{ApplyError, HostError};
pub use host::{
    AttributeReader, AttributeWriter, GraphLookup, Host, SelectionSource, Transaction,
    TransactionScope,
};
pub use rig::{
    classify, classify_selection, ApplyTo, Attr, Axis, Chain, Classification, Frame, Fulcrum,
    Mode, NodeId, NodeKind, Operation, Pref,
};
pub use scene::{MemoryScene, SceneError};
pub use session::{Availability, Session};
pub use transform::{apply_transformation, plan_transformation, ApplyReport, KeyframePlan};

use thiserror::Error;

/// Errors that can occur while running a transformation end to end
#[derive(Debug, Error)]
pub enum RigError {
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("preferences error: {0}")]
    Preferences(#[from] PreferencesError),

    #[error("{0}")]
    Apply(#[from] ApplyError),
}

/// Classify the host's selection and apply the preferences to it
///
/// Bone and curve selections are always flipped, as [`Preferences::to_pref`]
/// describes.
pub fn apply_to_selection<H: Host + ?Sized>(
    host: &mut H,
    preferences: &Preferences,
    reset_to_resting: bool,
    frame: Frame,
) -> Result<ApplyReport, ApplyError> {
    let classification = classify(&*host);
    let pref = preferences.to_pref(classification.operation, reset_to_resting);
    apply_transformation(host, &classification, &pref, frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_without_selection_is_rejected() {
        let mut scene = MemoryScene::new();
        let err = apply_to_selection(&mut scene, &Preferences::default(), false, 1).unwrap_err();
        assert_eq!(err, ApplyError::InvalidSelection(Operation::Undefined));
        // Nothing was planned, so no transaction was opened
        assert!(scene.transactions().is_empty());
    }

    #[test]
    fn test_rig_error_wraps_apply_error() {
        let err: RigError = ApplyError::invalid_anchors("no point selected").into();
        assert_eq!(err.to_string(), "invalid anchor selection: no point selected");
    }
}
