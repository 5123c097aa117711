//! Persisted dialog preferences
//!
//! The last used mode, axis, fulcrum and side are remembered between runs
//! in a small TOML file. The reset-to-resting option is not stored and
//! always starts off.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rig::types::{ApplyTo, Axis, Fulcrum, Mode, Operation, Pref};

/// Errors that can occur when loading or saving preferences
#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("Failed to access preferences file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse preferences TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize preferences: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Remembered transformation options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub mode: Mode,
    pub axis: Axis,
    pub fulcrum: Fulcrum,
    pub apply_to: ApplyTo,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load preferences from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, PreferencesError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load preferences from a file, falling back to defaults when it does
    /// not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self, PreferencesError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load preferences from a TOML string; missing keys take defaults
    pub fn from_str(content: &str) -> Result<Self, PreferencesError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, PreferencesError> {
        Ok(toml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), PreferencesError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_fulcrum(mut self, fulcrum: Fulcrum) -> Self {
        self.fulcrum = fulcrum;
        self
    }

    pub fn with_apply_to(mut self, apply_to: ApplyTo) -> Self {
        self.apply_to = apply_to;
        self
    }

    /// Build the request for an Apply on `operation`.
    ///
    /// Bone and curve chains can only be flipped, and have no centroid: a
    /// remembered centroid fulcrum becomes the deformation offset.
    pub fn to_pref(&self, operation: Operation, reset_to_resting: bool) -> Pref {
        let (mode, fulcrum) = if operation.is_flip_only() {
            let fulcrum = match self.fulcrum {
                Fulcrum::Centroid => Fulcrum::Offset,
                other => other,
            };
            (Mode::Flip, fulcrum)
        } else {
            (self.mode, self.fulcrum)
        };

        Pref::new()
            .with_mode(mode)
            .with_axis(self.axis)
            .with_fulcrum(fulcrum)
            .with_apply_to(self.apply_to)
            .with_reset_to_resting(reset_to_resting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.mode, Mode::Mirror);
        assert_eq!(prefs.axis, Axis::Horizontal);
        assert_eq!(prefs.fulcrum, Fulcrum::Origin);
        assert_eq!(prefs.apply_to, ApplyTo::BottomLeft);
    }

    #[test]
    fn test_parse_partial_toml() {
        let prefs = Preferences::from_str(
            r#"
mode = "symmetrize"
apply_to = "top-right"
"#,
        )
        .unwrap();
        assert_eq!(prefs.mode, Mode::Symmetrize);
        assert_eq!(prefs.apply_to, ApplyTo::TopRight);
        assert_eq!(prefs.axis, Axis::Horizontal);
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = Preferences::from_str(r#"mode = "spin""#);
        assert!(matches!(result, Err(PreferencesError::ParseError(_))));
    }

    #[test]
    fn test_round_trip() {
        let prefs = Preferences::new()
            .with_mode(Mode::Flip)
            .with_axis(Axis::Vertical)
            .with_fulcrum(Fulcrum::Centroid);
        let text = prefs.to_toml_string().unwrap();
        assert_eq!(Preferences::from_str(&text).unwrap(), prefs);
    }

    #[test]
    fn test_to_pref_forces_flip_on_bones() {
        let prefs = Preferences::new()
            .with_mode(Mode::Symmetrize)
            .with_fulcrum(Fulcrum::Centroid);

        let pref = prefs.to_pref(Operation::Bone, true);
        assert_eq!(pref.mode, Mode::Flip);
        assert_eq!(pref.fulcrum, Fulcrum::Offset);
        assert!(pref.reset_to_resting);

        let pref = prefs.to_pref(Operation::ClosedEnvelope, false);
        assert_eq!(pref.mode, Mode::Symmetrize);
        assert_eq!(pref.fulcrum, Fulcrum::Centroid);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let path = std::env::temp_dir().join("rig-symmetry-missing-prefs.toml");
        let _ = std::fs::remove_file(&path);
        assert_eq!(
            Preferences::load_or_default(&path).unwrap(),
            Preferences::default()
        );
    }
}
