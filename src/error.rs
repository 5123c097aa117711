//! Error types for host access and transformation

use thiserror::Error;

use crate::rig::types::{ChannelId, NodeId, Operation};

/// Failures reported by a host collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("node '{0}' does not exist")]
    MissingNode(NodeId),

    #[error("node '{node}' has no attribute '{attr}'")]
    MissingAttribute { node: NodeId, attr: String },

    #[error("channel '{0}' does not exist")]
    MissingChannel(ChannelId),

    #[error("cannot link a channel to '{attr}' on node '{node}'")]
    ChannelUnavailable { node: NodeId, attr: String },
}

impl HostError {
    /// Create a missing attribute error
    pub fn missing_attribute(node: &NodeId, attr: impl Into<String>) -> Self {
        Self::MissingAttribute {
            node: node.clone(),
            attr: attr.into(),
        }
    }
}

/// Errors that abort an Apply
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyError {
    /// The classification does not allow a transformation
    #[error("nothing to transform: selection is classified as {0}")]
    InvalidSelection(Operation),

    /// A node the transformation depends on is not linked into the chain
    #[error("broken deformer chain at '{node}': {reason}")]
    BrokenTopology { node: NodeId, reason: String },

    /// The selected points cannot define a symmetry line
    #[error("invalid anchor selection: {reason}")]
    InvalidAnchors { reason: String },

    /// A required attribute or channel could not be read, created or written
    #[error("attribute unavailable: {0}")]
    AttributeUnavailable(#[from] HostError),
}

impl ApplyError {
    /// Create a broken topology error
    pub fn broken(node: &NodeId, reason: impl Into<String>) -> Self {
        Self::BrokenTopology {
            node: node.clone(),
            reason: reason.into(),
        }
    }

    /// Create an invalid anchors error
    pub fn invalid_anchors(reason: impl Into<String>) -> Self {
        Self::InvalidAnchors {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_display() {
        let err = HostError::missing_attribute(&NodeId::from("Top/Curve"), "orientation0");
        assert_eq!(
            err.to_string(),
            "node 'Top/Curve' has no attribute 'orientation0'"
        );
    }

    #[test]
    fn test_host_error_converts_to_apply_error() {
        let err: ApplyError = HostError::MissingNode(NodeId::from("Top/Offset")).into();
        assert!(matches!(err, ApplyError::AttributeUnavailable(_)));
        assert!(err.to_string().contains("Top/Offset"));
    }

    #[test]
    fn test_invalid_selection_display() {
        let err = ApplyError::InvalidSelection(Operation::TooManySelected);
        assert!(err.to_string().contains("too many selected"));
    }
}
