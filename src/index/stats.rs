//! Index shape statistics.
//!
//! Every node record is classified into one of nine buckets by
//! (child count ∈ {0, 1, >1}) × (value count ∈ {0, 1, >1}). The buckets are
//! used to monitor index shape and efficiency across catalog generations;
//! they play no part in query correctness.

use std::fmt;

use serde::Serialize;

use crate::index::reader::NodeRef;

/// Bucket labels along one axis: exactly zero, exactly one, more than one.
const CLASSES: [&str; 3] = ["0", "1", ">1"];

/// Shape statistics for one serialized index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    /// Total number of node records
    pub node_count: u32,
    /// Number of distinct texts in the string table
    pub string_count: u32,
    /// `buckets[children-class][values-class]`, classes 0 / 1 / >1
    pub buckets: [[u32; 3]; 3],
}

impl IndexStats {
    /// Scan both regions record by record.
    ///
    /// Node records are laid out back to back, so a linear walk visits each
    /// exactly once without touching the tree structure.
    pub(crate) fn scan(strings: &[u8], nodes: &[u8]) -> Self {
        let mut stats = IndexStats::default();

        let mut pos = 0usize;
        while pos < nodes.len() {
            let Some(node) = NodeRef::parse(nodes, pos as u32) else {
                break;
            };
            stats.node_count += 1;
            stats.buckets[class_of(node.child_count)][class_of(node.value_count)] += 1;
            pos += node.record_len();
        }

        let mut pos = 0usize;
        while pos + 4 <= strings.len() {
            let len =
                u32::from_le_bytes([strings[pos], strings[pos + 1], strings[pos + 2], strings[pos + 3]])
                    as usize;
            let Some(next) = pos.checked_add(4).and_then(|p| p.checked_add(len)) else {
                break;
            };
            if next > strings.len() {
                break;
            }
            stats.string_count += 1;
            pos = next;
        }

        stats
    }

    /// Sum over all nine buckets; always equals `node_count`.
    pub fn bucket_total(&self) -> u32 {
        self.buckets.iter().flatten().sum()
    }
}

#[inline]
fn class_of(count: usize) -> usize {
    match count {
        0 => 0,
        1 => 1,
        _ => 2,
    }
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes:    {}", self.node_count)?;
        writeln!(f, "Strings:  {}", self.string_count)?;
        writeln!(f)?;
        writeln!(f, "{:>10} {:>10} {:>10} {:>10}", "children", "values=0", "values=1", "values>1")?;
        for (row, label) in CLASSES.iter().enumerate() {
            writeln!(
                f,
                "{:>10} {:>10} {:>10} {:>10}",
                label, self.buckets[row][0], self.buckets[row][1], self.buckets[row][2]
            )?;
        }
        Ok(())
    }
}
