//! Staged attribute overlay used while planning
//!
//! Planning reads through the stage: a value staged earlier in the same plan
//! shadows the host's value, just as a freshly written key would. Nothing
//! reaches the host until the plan is committed.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ApplyError;
use crate::host::AttributeReader;
use crate::rig::chain::Chain;
use crate::rig::types::{Attr, Frame, NodeId, NodeKind, Point};

/// A single planned key
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeWrite {
    pub node: NodeId,
    pub attr: Attr,
    pub frame: Frame,
    pub value: f64,
}

impl fmt::Display for KeyframeWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} @ {} = {:.4}",
            self.node, self.attr, self.frame, self.value
        )
    }
}

pub(crate) struct Stage<'a, R: AttributeReader + ?Sized> {
    reader: &'a R,
    chain: &'a Chain,
    frame: Frame,
    staged: BTreeMap<(usize, Attr), f64>,
}

impl<'a, R: AttributeReader + ?Sized> Stage<'a, R> {
    pub fn new(reader: &'a R, chain: &'a Chain, frame: Frame) -> Self {
        Self {
            reader,
            chain,
            frame,
            staged: BTreeMap::new(),
        }
    }

    pub fn chain(&self) -> &'a Chain {
        self.chain
    }

    pub fn kind(&self, index: usize) -> NodeKind {
        self.chain.node(index).kind
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.reader.aspect_ratio()
    }

    /// Staged value if any, else the host's value at the playhead
    pub fn get(&self, index: usize, attr: Attr) -> Result<f64, ApplyError> {
        if let Some(value) = self.staged.get(&(index, attr)) {
            return Ok(*value);
        }
        let value = self
            .reader
            .read_scalar(self.chain.id(index), attr, self.frame)?;
        Ok(value)
    }

    pub fn set(&mut self, index: usize, attr: Attr, value: f64) {
        self.staged.insert((index, attr), value);
    }

    /// Key the attribute at its current value
    pub fn pin(&mut self, index: usize, attr: Attr) -> Result<(), ApplyError> {
        let value = self.get(index, attr)?;
        self.set(index, attr, value);
        Ok(())
    }

    pub fn shift(&mut self, index: usize, attr: Attr, delta: f64) -> Result<(), ApplyError> {
        let value = self.get(index, attr)?;
        self.set(index, attr, value + delta);
        Ok(())
    }

    /// Offsets of every chain node, as currently staged
    pub fn positions(&self) -> Result<Vec<Point>, ApplyError> {
        (0..self.chain.len())
            .map(|index| {
                Ok(Point::new(
                    self.get(index, Attr::OffsetX)?,
                    self.get(index, Attr::OffsetY)?,
                ))
            })
            .collect()
    }

    /// Coalesced writes in chain order, all keyed at `frame`
    pub fn into_writes(self, frame: Frame) -> Vec<KeyframeWrite> {
        let chain = self.chain;
        self.staged
            .into_iter()
            .map(|((index, attr), value)| KeyframeWrite {
                node: chain.id(index).clone(),
                attr,
                frame,
                value,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::rig::types::Flag;
    use std::cell::Cell;

    struct Fixed {
        reads: Cell<usize>,
    }

    impl AttributeReader for Fixed {
        fn read_scalar(&self, _id: &NodeId, attr: Attr, _frame: Frame) -> Result<f64, HostError> {
            self.reads.set(self.reads.get() + 1);
            match attr {
                Attr::OffsetX => Ok(3.0),
                Attr::OffsetY => Ok(-1.0),
                _ => Ok(0.0),
            }
        }

        fn read_flag(&self, id: &NodeId, flag: Flag) -> Result<String, HostError> {
            Err(HostError::missing_attribute(id, flag.name()))
        }
    }

    fn chain() -> Chain {
        Chain::from_nodes(vec![
            (NodeId::from("a"), NodeKind::Offset),
            (NodeId::from("b"), NodeKind::Curve),
        ])
    }

    #[test]
    fn test_staged_value_shadows_host() {
        let reader = Fixed { reads: Cell::new(0) };
        let chain = chain();
        let mut stage = Stage::new(&reader, &chain, 5);

        stage.set(0, Attr::OffsetX, 10.0);
        assert_eq!(stage.get(0, Attr::OffsetX), Ok(10.0));
        assert_eq!(stage.get(1, Attr::OffsetX), Ok(3.0));
        assert_eq!(reader.reads.get(), 1);
    }

    #[test]
    fn test_writes_coalesce_per_attribute() {
        let reader = Fixed { reads: Cell::new(0) };
        let chain = chain();
        let mut stage = Stage::new(&reader, &chain, 5);

        stage.shift(1, Attr::OffsetX, 2.0).unwrap();
        stage.shift(1, Attr::OffsetX, 2.0).unwrap();
        stage.pin(0, Attr::OffsetY).unwrap();

        let writes = stage.into_writes(1);
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].node, NodeId::from("a"));
        assert_eq!(writes[0].value, -1.0);
        assert_eq!(writes[1].value, 7.0);
        assert!(writes.iter().all(|w| w.frame == 1));
    }
}
