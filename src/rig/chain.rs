//! Deformer chain reconstruction and topology classification

use log::{debug, warn};

use crate::error::ApplyError;
use crate::host::{AttributeReader, GraphLookup, SelectionSource};

use super::types::{Flag, NodeId, NodeKind, Operation};

/// One node of a deformer chain.
///
/// Neighbours are chain indices, never owned handles: the host keeps the
/// nodes alive, the chain only remembers how they are linked.
#[derive(Debug, Clone, PartialEq)]
pub struct DeformerNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub predecessor: Option<usize>,
    pub successor: Option<usize>,
}

/// Deformer nodes in downstream (source to destination) order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Chain {
    nodes: Vec<DeformerNode>,
}

impl Chain {
    /// Build a chain from nodes listed head first, linking neighbours the
    /// way the host lays envelopes out.
    ///
    /// Every node but the last points at the next one. Offset nodes past the
    /// head point back at the previous node. The tail wraps onto index 1 and
    /// the head's predecessor is the tail, which is what lets the end points
    /// of an envelope find the handles on the far side of the closing joint.
    pub fn from_nodes(nodes: Vec<(NodeId, NodeKind)>) -> Self {
        let len = nodes.len();
        let mut linked: Vec<DeformerNode> = nodes
            .into_iter()
            .enumerate()
            .map(|(index, (id, kind))| DeformerNode {
                id,
                kind,
                predecessor: (index > 0 && kind == NodeKind::Offset).then(|| index - 1),
                successor: (index + 1 < len).then(|| index + 1),
            })
            .collect();

        if let Some(last) = linked.last_mut() {
            last.successor = (len > 1).then_some(1);
        }
        if let Some(first) = linked.first_mut() {
            first.predecessor = Some(len - 1);
        }
        Self { nodes: linked }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[DeformerNode] {
        &self.nodes
    }

    /// Node at `index`; panics when out of range like slice indexing
    pub fn node(&self, index: usize) -> &DeformerNode {
        &self.nodes[index]
    }

    pub fn id(&self, index: usize) -> &NodeId {
        &self.nodes[index].id
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| &n.id == id)
    }

    /// Downstream neighbour, required for handle lookups
    pub fn successor(&self, index: usize) -> Result<usize, ApplyError> {
        let node = &self.nodes[index];
        node.successor
            .ok_or_else(|| ApplyError::broken(&node.id, "no downstream deformer"))
    }

    /// Upstream neighbour, required for handle lookups on offset nodes
    pub fn predecessor(&self, index: usize) -> Result<usize, ApplyError> {
        let node = &self.nodes[index];
        node.predecessor
            .ok_or_else(|| ApplyError::broken(&node.id, "no upstream deformer"))
    }
}

/// Result of classifying the current selection
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub operation: Operation,
    pub chain: Chain,
    /// Selected chain indices, wing-0 side first
    pub anchors: Vec<usize>,
    /// Number of selected deformer nodes
    pub selected: usize,
}

impl Classification {
    pub fn undefined() -> Self {
        Self {
            operation: Operation::Undefined,
            chain: Chain::default(),
            anchors: Vec::new(),
            selected: 0,
        }
    }
}

/// Classify the host's current selection
pub fn classify<H>(host: &H) -> Classification
where
    H: GraphLookup + AttributeReader + SelectionSource + ?Sized,
{
    classify_selection(host, &host.current_selection())
}

/// Classify an explicit selection.
///
/// Never fails: a selection without deformers, or a chain that cannot be
/// walked, classifies as [`Operation::Undefined`].
pub fn classify_selection<H>(host: &H, selection: &[NodeId]) -> Classification
where
    H: GraphLookup + AttributeReader + ?Sized,
{
    let apex: Vec<NodeId> = selection
        .iter()
        .filter(|id| host.node_kind(id).is_some())
        .cloned()
        .collect();

    let Some(first) = apex.first() else {
        debug!("no deformer node selected");
        return Classification::undefined();
    };

    let Some(group) = host.parent_of(first) else {
        warn!("selected node '{}' has no parent group", first);
        return Classification::undefined();
    };
    let limit = host.sub_node_count(&group);

    let head = find_head(host, first, limit);
    let Some(chain) = walk_chain(host, &head, limit) else {
        warn!(
            "deformer chain starting at '{}' does not terminate within {} nodes",
            head, limit
        );
        return Classification::undefined();
    };

    let anchors = anchor_indices(&chain, &apex);
    let operation = classify_chain(host, &chain, apex.len());
    debug!(
        "classified {} node chain from '{}' as {} (anchors {:?})",
        chain.len(),
        head,
        operation,
        anchors
    );

    Classification {
        operation,
        chain,
        anchors,
        selected: apex.len(),
    }
}

fn classify_chain<H>(host: &H, chain: &Chain, selected: usize) -> Operation
where
    H: AttributeReader + ?Sized,
{
    if chain.node(0).kind == NodeKind::Bone {
        return Operation::Bone;
    }

    let joint = chain.id(chain.len() - 1);
    if flag_is_set(host, joint, Flag::LocalReferential) {
        Operation::Curve
    } else if flag_is_set(host, joint, Flag::ClosePath) {
        if selected > 2 {
            Operation::TooManySelected
        } else {
            Operation::ClosedEnvelope
        }
    } else {
        Operation::OpenEnvelope
    }
}

fn flag_is_set<H>(host: &H, id: &NodeId, flag: Flag) -> bool
where
    H: AttributeReader + ?Sized,
{
    match host.read_flag(id, flag) {
        Ok(value) => value == "Y",
        Err(e) => {
            debug!("treating unreadable flag as unset: {}", e);
            false
        }
    }
}

/// Walk upstream while the source is still a deformer
fn find_head<H>(graph: &H, start: &NodeId, limit: usize) -> NodeId
where
    H: GraphLookup + ?Sized,
{
    let mut current = start.clone();
    for _ in 0..limit {
        match graph.source_node(&current, 0) {
            Some(src) if graph.node_kind(&src).is_some() => current = src,
            _ => break,
        }
    }
    current
}

/// Walk downstream from the head until a non-deformer is reached.
///
/// Returns `None` when no terminal node is found within `limit` steps.
fn walk_chain<H>(graph: &H, head: &NodeId, limit: usize) -> Option<Chain>
where
    H: GraphLookup + ?Sized,
{
    let mut nodes = Vec::new();
    let mut current = Some(head.clone());

    for _ in 0..=limit {
        let kind = current.as_ref().and_then(|id| graph.node_kind(id));
        match (current.take(), kind) {
            (Some(id), Some(kind)) => {
                current = graph.destination_node(&id, 0, 0);
                nodes.push((id, kind));
            }
            _ => return (!nodes.is_empty()).then(|| Chain::from_nodes(nodes)),
        }
    }
    None
}

/// Resolve selected nodes to chain indices, wing-0 side first.
///
/// Two adjacent anchors `i, i+1` come back as `[i+1, i]`; any other pair as
/// `[min, max]`.
fn anchor_indices(chain: &Chain, apex: &[NodeId]) -> Vec<usize> {
    let found: Vec<usize> = chain
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| apex.contains(&node.id))
        .map(|(index, _)| index)
        .collect();

    if found.len() < 2 {
        return found;
    }

    let min = found.iter().copied().min().unwrap_or(0);
    let max = found.iter().copied().max().unwrap_or(0);
    if min + 1 == max {
        vec![max, min]
    } else {
        vec![min, max]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[(&str, NodeKind)]) -> Vec<(NodeId, NodeKind)> {
        names
            .iter()
            .map(|(name, kind)| (NodeId::from(*name), *kind))
            .collect()
    }

    #[test]
    fn test_from_nodes_links_envelope() {
        let chain = Chain::from_nodes(ids(&[
            ("o0", NodeKind::Offset),
            ("c1", NodeKind::Curve),
            ("c2", NodeKind::Curve),
            ("c3", NodeKind::Curve),
        ]));

        assert_eq!(chain.node(0).predecessor, Some(3));
        assert_eq!(chain.node(0).successor, Some(1));
        assert_eq!(chain.node(1).predecessor, None);
        assert_eq!(chain.node(2).successor, Some(3));
        // The tail wraps onto the first curve, not the head
        assert_eq!(chain.node(3).successor, Some(1));
    }

    #[test]
    fn test_from_nodes_offset_inside_chain_points_back() {
        let chain = Chain::from_nodes(ids(&[
            ("c0", NodeKind::Curve),
            ("o1", NodeKind::Offset),
        ]));
        assert_eq!(chain.node(1).predecessor, Some(0));
    }

    #[test]
    fn test_single_node_has_no_successor() {
        let chain = Chain::from_nodes(ids(&[("o0", NodeKind::Offset)]));
        assert_eq!(chain.node(0).successor, None);
        assert!(chain.successor(0).is_err());
        assert_eq!(chain.predecessor(0), Ok(0));
    }

    #[test]
    fn test_index_of() {
        let chain = Chain::from_nodes(ids(&[
            ("a", NodeKind::Curve),
            ("b", NodeKind::Curve),
            ("c", NodeKind::Curve),
        ]));
        assert_eq!(chain.index_of(&NodeId::from("c")), Some(2));
        assert_eq!(chain.index_of(&NodeId::from("d")), None);
    }

    #[test]
    fn test_anchor_order_adjacent() {
        let chain = Chain::from_nodes(ids(&[
            ("a", NodeKind::Offset),
            ("b", NodeKind::Curve),
            ("c", NodeKind::Curve),
            ("d", NodeKind::Curve),
        ]));
        let anchors = anchor_indices(&chain, &[NodeId::from("b"), NodeId::from("c")]);
        assert_eq!(anchors, vec![2, 1]);
    }

    #[test]
    fn test_anchor_order_wrapped_pair() {
        let chain = Chain::from_nodes(ids(&[
            ("a", NodeKind::Offset),
            ("b", NodeKind::Curve),
            ("c", NodeKind::Curve),
            ("d", NodeKind::Curve),
        ]));
        let anchors = anchor_indices(&chain, &[NodeId::from("c"), NodeId::from("a")]);
        assert_eq!(anchors, vec![0, 2]);
    }
}
