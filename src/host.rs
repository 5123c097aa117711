//! Collaborator interfaces the engine needs from the host application
//!
//! The host owns the node graph, the attribute store and the undo stack.
//! The engine only ever holds [`NodeId`] handles and chain indices; every
//! lookup goes through these traits at Apply time.

use std::ops::{Deref, DerefMut};

use crate::error::HostError;
use crate::rig::types::{Attr, ChannelId, Flag, Frame, NodeId, NodeKind};

/// Read-only view of the host's node graph
pub trait GraphLookup {
    /// Deformer kind of a node, or `None` for any other node type
    fn node_kind(&self, id: &NodeId) -> Option<NodeKind>;

    /// Group that contains the node
    fn parent_of(&self, id: &NodeId) -> Option<NodeId>;

    /// Node connected to the given input port
    fn source_node(&self, id: &NodeId, port: usize) -> Option<NodeId>;

    /// The `link`-th node connected to the given output port
    fn destination_node(&self, id: &NodeId, port: usize, link: usize) -> Option<NodeId>;

    /// Number of nodes directly inside a group
    fn sub_node_count(&self, parent: &NodeId) -> usize;
}

/// Read access to animated attributes
pub trait AttributeReader {
    /// Value of a numeric attribute at a frame
    fn read_scalar(&self, id: &NodeId, attr: Attr, frame: Frame) -> Result<f64, HostError>;

    /// Text value of a flag attribute (`"Y"` / `"N"`)
    fn read_flag(&self, id: &NodeId, flag: Flag) -> Result<String, HostError>;

    /// Ratio of horizontal to vertical scene units
    fn aspect_ratio(&self) -> f64 {
        1.0
    }
}

/// Write access to animation channels
pub trait AttributeWriter {
    /// Channel linked to the attribute, creating and linking one if needed
    fn ensure_channel(&mut self, id: &NodeId, attr: Attr) -> Result<ChannelId, HostError>;

    fn write_keyframe(
        &mut self,
        channel: &ChannelId,
        frame: Frame,
        value: f64,
    ) -> Result<(), HostError>;

    fn clear_all_keyframes(&mut self, channel: &ChannelId) -> Result<(), HostError>;

    /// Copy the attribute's value at `frame` into its resting parameter
    fn copy_to_resting(&mut self, id: &NodeId, attr: Attr, frame: Frame)
        -> Result<(), HostError>;
}

/// Undo accumulation around a batch of writes
pub trait TransactionScope {
    fn begin(&mut self, label: &str);
    fn end(&mut self);
}

/// Source of the user's current node selection
pub trait SelectionSource {
    fn current_selection(&self) -> Vec<NodeId>;
}

/// Everything an interactive session needs from its host
pub trait Host:
    GraphLookup + AttributeReader + AttributeWriter + TransactionScope + SelectionSource
{
}

impl<T> Host for T where
    T: GraphLookup + AttributeReader + AttributeWriter + TransactionScope + SelectionSource + ?Sized
{
}

/// Scoped undo transaction.
///
/// Begins on construction and ends when dropped, so every exit path of an
/// Apply closes the undo step. Dereferences to the wrapped host.
pub struct Transaction<'h, H: TransactionScope + ?Sized> {
    host: &'h mut H,
}

impl<'h, H: TransactionScope + ?Sized> Transaction<'h, H> {
    pub fn begin(host: &'h mut H, label: &str) -> Self {
        host.begin(label);
        Self { host }
    }
}

impl<H: TransactionScope + ?Sized> Deref for Transaction<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: TransactionScope + ?Sized> DerefMut for Transaction<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: TransactionScope + ?Sized> Drop for Transaction<'_, H> {
    fn drop(&mut self) {
        self.host.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl TransactionScope for Recorder {
        fn begin(&mut self, label: &str) {
            self.events.push(format!("begin {}", label));
        }

        fn end(&mut self) {
            self.events.push("end".to_string());
        }
    }

    fn fails_inside(host: &mut Recorder) -> Result<(), String> {
        let mut tx = Transaction::begin(host, "Flip");
        tx.events.push("write".to_string());
        Err("early exit".to_string())
    }

    #[test]
    fn test_transaction_ends_on_drop() {
        let mut host = Recorder::default();
        {
            let _tx = Transaction::begin(&mut host, "Mirror");
        }
        assert_eq!(host.events, vec!["begin Mirror", "end"]);
    }

    #[test]
    fn test_transaction_ends_on_error_path() {
        let mut host = Recorder::default();
        assert!(fails_inside(&mut host).is_err());
        assert_eq!(host.events, vec!["begin Flip", "write", "end"]);
    }
}
