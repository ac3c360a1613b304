//! Precomputed zone-to-zone travel times (seconds).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Network node id; every zone is a node and a station sits on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dense origin × destination matrix. Column order is the node order given at
/// construction and is the tie-break order for equal travel times.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimeMatrix {
    nodes: Vec<NodeId>,
    positions: HashMap<NodeId, usize>,
    secs: Vec<f64>,
}

impl TravelTimeMatrix {
    /// `rows[i][j]` is the travel time from `nodes[i]` to `nodes[j]`.
    pub fn new(nodes: Vec<NodeId>, rows: Vec<Vec<f64>>) -> Result<Self, ConfigurationError> {
        if rows.len() != nodes.len() {
            return Err(ConfigurationError::MatrixRowCount {
                nodes: nodes.len(),
                rows: rows.len(),
            });
        }

        let mut positions = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if positions.insert(*node, i).is_some() {
                return Err(ConfigurationError::DuplicateNode(*node));
            }
        }

        let mut secs = Vec::with_capacity(nodes.len() * nodes.len());
        for (from, row) in nodes.iter().zip(rows) {
            if row.len() != nodes.len() {
                return Err(ConfigurationError::MatrixRowLength {
                    node: *from,
                    len: row.len(),
                    expected: nodes.len(),
                });
            }
            for (to, value) in nodes.iter().zip(&row) {
                if !value.is_finite() || *value < 0.0 {
                    return Err(ConfigurationError::InvalidTravelTime {
                        from: *from,
                        to: *to,
                        secs: *value,
                    });
                }
            }
            secs.extend(row);
        }

        Ok(Self {
            nodes,
            positions,
            secs,
        })
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.positions.contains_key(&node)
    }

    pub fn secs(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let i = *self.positions.get(&from)?;
        let j = *self.positions.get(&to)?;
        Some(self.secs[i * self.nodes.len() + j])
    }

    /// Travel times from `from` to every node, in column order.
    pub fn row(&self, from: NodeId) -> Option<impl Iterator<Item = (NodeId, f64)> + '_> {
        let i = *self.positions.get(&from)?;
        let n = self.nodes.len();
        Some(
            self.nodes
                .iter()
                .copied()
                .zip(self.secs[i * n..(i + 1) * n].iter().copied()),
        )
    }
}
