//! Interactive session state
//!
//! A front end keeps one [`Session`] alive: it re-classifies whenever the
//! host reports a selection change, tells the front end which options make
//! sense for the classification, and applies with the remembered
//! preferences.

use log::info;

use crate::config::Preferences;
use crate::error::ApplyError;
use crate::host::{AttributeReader, GraphLookup, Host, SelectionSource};
use crate::rig::chain::{classify, Classification};
use crate::rig::types::{Axis, Frame, Mode, Operation};
use crate::transform::{apply_transformation, ApplyReport};

/// A mode a front end may offer, with its button text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeOption {
    pub mode: Mode,
    pub label: &'static str,
}

/// Which options make sense for the current classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub apply_enabled: bool,
    pub modes: Vec<ModeOption>,
    pub centroid_offered: bool,
    /// Text of the offset fulcrum option
    pub offset_label: Option<&'static str>,
    /// Text of the (top/right, bottom/left) side options; only shown when
    /// symmetrizing
    pub side_labels: Option<(&'static str, &'static str)>,
    pub hints: Vec<&'static str>,
}

impl Availability {
    pub fn for_operation(operation: Operation, preferences: &Preferences) -> Self {
        match operation {
            Operation::Undefined | Operation::TooManySelected => {
                let hint = if operation == Operation::Undefined {
                    "Please select a point on a deformer"
                } else {
                    "Too many points selected. Please select only 1-2 points"
                };
                Self {
                    apply_enabled: false,
                    modes: Vec::new(),
                    centroid_offered: false,
                    offset_label: None,
                    side_labels: None,
                    hints: vec![hint],
                }
            }

            Operation::Bone | Operation::Curve => Self {
                apply_enabled: true,
                modes: vec![ModeOption {
                    mode: Mode::Flip,
                    label: "Flip by moving points across axis",
                }],
                centroid_offered: false,
                offset_label: Some("Deformation Offset"),
                side_labels: None,
                hints: vec![if operation == Operation::Bone {
                    "Bone deformer selected"
                } else {
                    "Curve deformer selected"
                }],
            },

            Operation::ClosedEnvelope | Operation::OpenEnvelope => {
                let (offset_label, hints) = if operation == Operation::ClosedEnvelope {
                    (
                        "Selected Point(s)",
                        vec![
                            "Select a point you define as one on the line of symmetry",
                            "If the line is between 2 points, select both points",
                        ],
                    )
                } else {
                    ("Mid Point(s)", vec!["Open envelope deformer selected"])
                };

                let side_labels = (preferences.mode == Mode::Symmetrize).then(|| {
                    match preferences.axis {
                        Axis::Vertical => ("Top", "Bottom"),
                        Axis::Horizontal => ("Right", "Left"),
                    }
                });

                Self {
                    apply_enabled: true,
                    modes: envelope_modes(preferences.mode),
                    centroid_offered: true,
                    offset_label: Some(offset_label),
                    side_labels,
                    hints,
                }
            }
        }
    }
}

/// Mode texts spell out the difference between mirror and flip relative to
/// the mode currently chosen
fn envelope_modes(current: Mode) -> Vec<ModeOption> {
    let (mirror, flip) = match current {
        Mode::Mirror => ("Mirror while maintaining sides of points", "Flip"),
        Mode::Flip => ("Mirror", "Flip by moving points across axis"),
        Mode::Symmetrize => ("Mirror", "Flip"),
    };
    vec![
        ModeOption {
            mode: Mode::Mirror,
            label: mirror,
        },
        ModeOption {
            mode: Mode::Flip,
            label: flip,
        },
        ModeOption {
            mode: Mode::Symmetrize,
            label: "Symmetrize",
        },
    ]
}

/// Classification and preferences carried between user actions
#[derive(Debug, Clone)]
pub struct Session {
    preferences: Preferences,
    reset_to_resting: bool,
    classification: Classification,
}

impl Session {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            reset_to_resting: false,
            classification: Classification::undefined(),
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
    }

    pub fn set_reset_to_resting(&mut self, reset: bool) {
        self.reset_to_resting = reset;
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Re-classify the host's selection
    pub fn selection_changed<H>(&mut self, host: &H) -> &Classification
    where
        H: GraphLookup + AttributeReader + SelectionSource + ?Sized,
    {
        self.classification = classify(host);
        &self.classification
    }

    pub fn availability(&self) -> Availability {
        Availability::for_operation(self.classification.operation, &self.preferences)
    }

    /// Apply to the current classification, then re-classify
    pub fn apply<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        frame: Frame,
    ) -> Result<ApplyReport, ApplyError> {
        let pref = self
            .preferences
            .to_pref(self.classification.operation, self.reset_to_resting);
        info!(
            "applying {} ({} axis) to {}",
            pref.mode, pref.axis, self.classification.operation
        );
        let result = apply_transformation(host, &self.classification, &pref, frame);
        self.selection_changed(&*host);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::types::Fulcrum;

    #[test]
    fn test_disabled_without_selection() {
        let a = Availability::for_operation(Operation::Undefined, &Preferences::default());
        assert!(!a.apply_enabled);
        assert_eq!(a.hints, vec!["Please select a point on a deformer"]);

        let a = Availability::for_operation(Operation::TooManySelected, &Preferences::default());
        assert!(!a.apply_enabled);
        assert!(a.hints[0].starts_with("Too many points selected"));
    }

    #[test]
    fn test_bones_only_flip() {
        let a = Availability::for_operation(Operation::Bone, &Preferences::default());
        assert!(a.apply_enabled);
        assert_eq!(a.modes.len(), 1);
        assert_eq!(a.modes[0].mode, Mode::Flip);
        assert!(!a.centroid_offered);
        assert_eq!(a.offset_label, Some("Deformation Offset"));
    }

    #[test]
    fn test_closed_envelope_hints() {
        let a = Availability::for_operation(Operation::ClosedEnvelope, &Preferences::default());
        assert_eq!(a.offset_label, Some("Selected Point(s)"));
        assert_eq!(a.hints.len(), 2);
        assert_eq!(a.modes[0].label, "Mirror while maintaining sides of points");
        assert_eq!(a.side_labels, None);
    }

    #[test]
    fn test_side_labels_follow_axis() {
        let prefs = Preferences::new()
            .with_mode(Mode::Symmetrize)
            .with_axis(Axis::Vertical)
            .with_fulcrum(Fulcrum::Centroid);
        let a = Availability::for_operation(Operation::OpenEnvelope, &prefs);
        assert_eq!(a.side_labels, Some(("Top", "Bottom")));
        assert_eq!(a.offset_label, Some("Mid Point(s)"));
    }

    #[test]
    fn test_new_session_is_undefined() {
        let session = Session::new(Preferences::default());
        assert_eq!(session.classification().operation, Operation::Undefined);
        assert!(!session.availability().apply_enabled);
    }
}
