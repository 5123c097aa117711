//! Deformer chain model
//!
//! Pure computations over a rig: chain reconstruction and classification,
//! wing partitioning, pivot offsets and the angle math used when reflecting
//! handles. Nothing in here writes to the host.

pub mod angle;
pub mod chain;
pub mod pivot;
pub mod types;
pub mod wings;

pub use angle::{nearest_equivalent, projected_angle, reflect_handle};
pub use chain::{classify, classify_selection, Chain, Classification, DeformerNode};
pub use pivot::resolve_offset;
pub use types::{
    ApplyTo, Attr, Axis, ChannelId, Flag, Frame, Fulcrum, Mode, NodeId, NodeKind, Operation,
    ParseOptionError, Point, Pref, RESTING_FRAME,
};
pub use wings::{
    partition_closed, partition_open, resolve_orientation, ShapeOrientation, Wing,
    WingPartition,
};
