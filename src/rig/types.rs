//! Core types shared by the chain model, the partitioner and the engine

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Animation frame number. Frames start at 1.
pub type Frame = u32;

/// Frame that receives keys (and feeds the resting parameters) when an
/// Apply also resets the resting pose.
pub const RESTING_FRAME: Frame = 1;

/// Opaque host handle for a node (for example a node path like `Top/Curve_1`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Handle of an animation channel owned by the host
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 2D point in scene units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The deformer node kinds a chain is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Bone,
    Curve,
    Offset,
}

impl NodeKind {
    /// Map a host module type name to a deformer kind.
    ///
    /// Any other module type is not part of a deformer chain.
    pub fn from_module_type(name: &str) -> Option<Self> {
        match name {
            "BendyBoneModule" => Some(Self::Bone),
            "CurveModule" => Some(Self::Curve),
            "OffsetModule" => Some(Self::Offset),
            _ => None,
        }
    }

    pub fn module_type(&self) -> &'static str {
        match self {
            Self::Bone => "BendyBoneModule",
            Self::Curve => "CurveModule",
            Self::Offset => "OffsetModule",
        }
    }

    /// Every animatable attribute of this kind, in resting-copy order
    pub fn attributes(&self) -> &'static [Attr] {
        match self {
            Self::Bone => &[
                Attr::OffsetX,
                Attr::OffsetY,
                Attr::Radius,
                Attr::Orientation,
                Attr::Bias,
                Attr::Length,
            ],
            Self::Offset => &[Attr::OffsetX, Attr::OffsetY, Attr::Orientation],
            Self::Curve => &[
                Attr::OffsetX,
                Attr::OffsetY,
                Attr::Orientation0,
                Attr::Length0,
                Attr::Orientation1,
                Attr::Length1,
            ],
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bone => write!(f, "bone"),
            Self::Curve => write!(f, "curve"),
            Self::Offset => write!(f, "offset"),
        }
    }
}

/// Numeric deformer attributes the engine reads and keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attr {
    OffsetX,
    OffsetY,
    Orientation,
    Orientation0,
    Orientation1,
    Length0,
    Length1,
    Radius,
    Bias,
    Length,
}

impl Attr {
    /// Host attribute name
    pub fn name(&self) -> &'static str {
        match self {
            Self::OffsetX => "offset.x",
            Self::OffsetY => "offset.y",
            Self::Orientation => "orientation",
            Self::Orientation0 => "orientation0",
            Self::Orientation1 => "orientation1",
            Self::Length0 => "length0",
            Self::Length1 => "length1",
            Self::Radius => "radius",
            Self::Bias => "bias",
            Self::Length => "length",
        }
    }

    /// Name of the resting-parameter attribute this attribute is copied into.
    ///
    /// Bones and envelope nodes use different prefixes for the same concept.
    pub fn resting_name(&self, kind: NodeKind) -> Option<&'static str> {
        match (kind, self) {
            (NodeKind::Bone, Self::OffsetX) => Some("restoffset.x"),
            (NodeKind::Bone, Self::OffsetY) => Some("restoffset.y"),
            (NodeKind::Bone, Self::Radius) => Some("restradius"),
            (NodeKind::Bone, Self::Orientation) => Some("restorientation"),
            (NodeKind::Bone, Self::Bias) => Some("restbias"),
            (NodeKind::Bone, Self::Length) => Some("restlength"),
            (NodeKind::Offset, Self::OffsetX) | (NodeKind::Curve, Self::OffsetX) => {
                Some("restingoffset.x")
            }
            (NodeKind::Offset, Self::OffsetY) | (NodeKind::Curve, Self::OffsetY) => {
                Some("restingoffset.y")
            }
            (NodeKind::Offset, Self::Orientation) => Some("restingorientation"),
            (NodeKind::Curve, Self::Orientation0) => Some("restingorientation0"),
            (NodeKind::Curve, Self::Orientation1) => Some("restingorientation1"),
            (NodeKind::Curve, Self::Length0) => Some("restlength0"),
            (NodeKind::Curve, Self::Length1) => Some("restlength1"),
            _ => None,
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Boolean-as-string flags read from the terminal joint of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Curve deformers parented to a local referential
    LocalReferential,
    /// Envelope whose last curve closes back onto the first point
    ClosePath,
}

impl Flag {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LocalReferential => "localreferential",
            Self::ClosePath => "closepath",
        }
    }
}

/// Topology classification of the selected chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Undefined,
    TooManySelected,
    Bone,
    Curve,
    ClosedEnvelope,
    OpenEnvelope,
}

impl Operation {
    /// Whether an Apply may run on this classification
    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::Undefined | Self::TooManySelected)
    }

    /// Bone and curve deformers only support flipping
    pub fn is_flip_only(&self) -> bool {
        matches!(self, Self::Bone | Self::Curve)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::TooManySelected => write!(f, "too many selected"),
            Self::Bone => write!(f, "bone"),
            Self::Curve => write!(f, "curve"),
            Self::ClosedEnvelope => write!(f, "closed envelope"),
            Self::OpenEnvelope => write!(f, "open envelope"),
        }
    }
}

/// Error returned when parsing one of the option enums from text
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Transformation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Mirror,
    Flip,
    Symmetrize,
}

impl FromStr for Mode {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mirror" => Ok(Self::Mirror),
            "flip" => Ok(Self::Flip),
            "symmetrize" | "symmetry" => Ok(Self::Symmetrize),
            _ => Err(ParseOptionError {
                kind: "mode",
                value: s.to_string(),
                expected: "mirror, flip, symmetrize",
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mirror => write!(f, "mirror"),
            Self::Flip => write!(f, "flip"),
            Self::Symmetrize => write!(f, "symmetrize"),
        }
    }
}

/// Axis a transformation reflects across
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    /// Position attribute negated by a reflection across this axis
    pub fn position_attr(&self) -> Attr {
        match self {
            Self::Horizontal => Attr::OffsetX,
            Self::Vertical => Attr::OffsetY,
        }
    }

    /// Position attribute left untouched by the reflection
    pub fn cross_attr(&self) -> Attr {
        match self {
            Self::Horizontal => Attr::OffsetY,
            Self::Vertical => Attr::OffsetX,
        }
    }

    /// Component of a point along this axis' position attribute
    pub fn component(&self, point: Point) -> f64 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }
}

impl FromStr for Axis {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Ok(Self::Horizontal),
            "vertical" | "v" => Ok(Self::Vertical),
            _ => Err(ParseOptionError {
                kind: "axis",
                value: s.to_string(),
                expected: "horizontal, vertical",
            }),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => write!(f, "horizontal"),
            Self::Vertical => write!(f, "vertical"),
        }
    }
}

/// Reference point the transformation pivots around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fulcrum {
    /// Scene origin (0, 0)
    #[default]
    Origin,
    /// Middle of the shape's bounding extent
    Centroid,
    /// Selected or middle point(s), or the deformation offset for bones/curves
    Offset,
}

impl FromStr for Fulcrum {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "origin" => Ok(Self::Origin),
            "centroid" | "center" => Ok(Self::Centroid),
            "offset" => Ok(Self::Offset),
            _ => Err(ParseOptionError {
                kind: "fulcrum",
                value: s.to_string(),
                expected: "origin, centroid, offset",
            }),
        }
    }
}

impl fmt::Display for Fulcrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin => write!(f, "origin"),
            Self::Centroid => write!(f, "centroid"),
            Self::Offset => write!(f, "offset"),
        }
    }
}

/// Side that receives the symmetrized values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyTo {
    TopRight,
    #[default]
    BottomLeft,
}

impl FromStr for ApplyTo {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top-right" | "topright" | "top" | "right" => Ok(Self::TopRight),
            "bottom-left" | "bottomleft" | "bottom" | "left" => Ok(Self::BottomLeft),
            _ => Err(ParseOptionError {
                kind: "side",
                value: s.to_string(),
                expected: "top-right, bottom-left",
            }),
        }
    }
}

impl fmt::Display for ApplyTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopRight => write!(f, "top-right"),
            Self::BottomLeft => write!(f, "bottom-left"),
        }
    }
}

/// A single transformation request
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pref {
    pub mode: Mode,
    pub axis: Axis,
    pub fulcrum: Fulcrum,
    pub apply_to: ApplyTo,
    /// Clear prior keys, key frame 1 and copy the result into the resting pose
    pub reset_to_resting: bool,
}

impl Pref {
    /// Create a request with default options
    pub fn new() -> Self {
        Self::default()
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

    /// Also apply the result to the resting parameters
    pub fn with_reset_to_resting(mut self, reset: bool) -> Self {
        self.reset_to_resting = reset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_type_round_trip() {
        for kind in [NodeKind::Bone, NodeKind::Curve, NodeKind::Offset] {
            assert_eq!(NodeKind::from_module_type(kind.module_type()), Some(kind));
        }
        assert_eq!(NodeKind::from_module_type("READ"), None);
    }

    #[test]
    fn test_every_attribute_has_a_resting_name() {
        for kind in [NodeKind::Bone, NodeKind::Curve, NodeKind::Offset] {
            for attr in kind.attributes() {
                assert!(
                    attr.resting_name(kind).is_some(),
                    "{} has no resting name on {}",
                    attr,
                    kind
                );
            }
        }
        assert_eq!(Attr::Radius.resting_name(NodeKind::Curve), None);
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("Symmetrize".parse::<Mode>(), Ok(Mode::Symmetrize));
        assert_eq!("v".parse::<Axis>(), Ok(Axis::Vertical));
        assert_eq!("centroid".parse::<Fulcrum>(), Ok(Fulcrum::Centroid));
        assert_eq!("top-right".parse::<ApplyTo>(), Ok(ApplyTo::TopRight));
        assert!("sideways".parse::<Axis>().is_err());
    }

    #[test]
    fn test_parse_error_lists_expected_values() {
        let err = "spin".parse::<Mode>().unwrap_err();
        assert!(err.to_string().contains("mirror, flip, symmetrize"));
    }

    #[test]
    fn test_pref_builder() {
        let pref = Pref::new()
            .with_mode(Mode::Flip)
            .with_axis(Axis::Vertical)
            .with_fulcrum(Fulcrum::Centroid)
            .with_apply_to(ApplyTo::TopRight)
            .with_reset_to_resting(true);

        assert_eq!(pref.mode, Mode::Flip);
        assert_eq!(pref.axis, Axis::Vertical);
        assert_eq!(pref.fulcrum, Fulcrum::Centroid);
        assert_eq!(pref.apply_to, ApplyTo::TopRight);
        assert!(pref.reset_to_resting);
    }

    #[test]
    fn test_axis_attributes() {
        assert_eq!(Axis::Horizontal.position_attr(), Attr::OffsetX);
        assert_eq!(Axis::Horizontal.cross_attr(), Attr::OffsetY);
        assert_eq!(Axis::Vertical.position_attr(), Attr::OffsetY);
        assert_eq!(Axis::Vertical.component(Point::new(1.0, 2.0)), 2.0);
    }
}
