//! Memory-mapped index reader.
//!
//! The reader is a thin, bounds-checked view over one contiguous byte
//! buffer; no tree of pointers is ever materialized. Node and string
//! "references" are integer offsets into the two regions, resolved by
//! slicing the buffer on demand.
//!
//! Once [`IndexReader::open`] or [`IndexReader::from_bytes`] succeeds, the
//! buffer is never mutated, so one reader can serve any number of concurrent
//! `lookup` calls without locks.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::index::builder::dot_escape;
use crate::index::stats::IndexStats;
use crate::index::types::{FormatError, IndexHeader, Match};

/// Backing bytes for a loaded index
enum IndexData {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl AsRef<[u8]> for IndexData {
    fn as_ref(&self) -> &[u8] {
        match self {
            IndexData::Owned(bytes) => bytes,
            IndexData::Mapped(mmap) => mmap,
        }
    }
}

/// Immutable, queryable view over a serialized index.
///
/// The reader exclusively owns its backing buffer for its whole lifetime;
/// the structure is discarded as one unit, never node by node.
pub struct IndexReader {
    data: IndexData,
    header: IndexHeader,
}

impl IndexReader {
    /// Load an index from an owned buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FormatError> {
        let header = IndexHeader::read(&bytes)?;
        Ok(Self {
            data: IndexData::Owned(bytes),
            header,
        })
    }

    /// Memory-map an index file and validate it.
    pub fn open(path: &Path) -> Result<Self, FormatError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let header = IndexHeader::read(&mmap)?;
        Ok(Self {
            data: IndexData::Mapped(mmap),
            header,
        })
    }

    pub fn header(&self) -> &IndexHeader {
        &self.header
    }

    /// Total size of the backing buffer in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.as_ref().len()
    }

    fn strings(&self) -> &[u8] {
        let start = self.header.strings_start as usize;
        &self.data.as_ref()[start..start + self.header.strings_len as usize]
    }

    fn nodes(&self) -> &[u8] {
        let start = self.header.nodes_start as usize;
        &self.data.as_ref()[start..start + self.header.nodes_len as usize]
    }

    /// Find every stored `(offset, value)` pair whose display name contains
    /// `query` starting at some non-dot token boundary.
    ///
    /// The result may contain duplicate ids (one per matching boundary);
    /// callers de-duplicate. Order is unspecified. Queries never fail: an
    /// empty query returns an empty vec.
    pub fn lookup(&self, query: &str) -> Vec<Match> {
        if query.is_empty() {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        let needle = needle.as_bytes();
        let nodes = self.nodes();
        let strings = self.strings();

        let mut results = Vec::new();
        let mut queue: VecDeque<(u32, usize)> = VecDeque::new();
        queue.push_back((self.header.root_offset, 0));

        while let Some((offset, matched)) = queue.pop_front() {
            let Some(node) = NodeRef::parse(nodes, offset) else {
                continue;
            };

            if matched == needle.len() {
                // Match root: everything below this node matches the query.
                collect_subtree(nodes, offset, &mut results);
                continue;
            }

            let rest = &needle[matched..];

            // Children are sorted by text, so all candidates sharing a
            // prefix with `rest` are contiguous from the first child whose
            // text starts with rest[0].
            let child_count = node.child_count;
            let mut lo = 0usize;
            let mut hi = child_count;
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                let first = NodeRef::parse(nodes, node.child(mid))
                    .and_then(|c| c.text(strings).first().copied());
                if first.is_none_or(|b| b < rest[0]) {
                    lo = mid + 1;
                } else {
                    hi = mid;
                }
            }

            for slot in lo..child_count {
                let child_offset = node.child(slot);
                let Some(child) = NodeRef::parse(nodes, child_offset) else {
                    break;
                };
                let common = common_prefix_len(child.text(strings), rest);
                if common == 0 {
                    // Sort order guarantees no later sibling can match.
                    break;
                }
                queue.push_back((child_offset, matched + common));
            }
        }

        results
    }

    /// Classify every node record into the shape-statistics buckets.
    pub fn stats(&self) -> IndexStats {
        IndexStats::scan(self.strings(), self.nodes())
    }

    /// Export the serialized tree as a Graphviz digraph, same shape as the
    /// builder-side export.
    pub fn write_dot<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let nodes = self.nodes();
        let strings = self.strings();

        writeln!(w, "digraph index {{")?;

        let mut stack = vec![self.header.root_offset];
        while let Some(offset) = stack.pop() {
            let Some(node) = NodeRef::parse(nodes, offset) else {
                continue;
            };

            let pairs: Vec<String> = (0..node.value_count)
                .map(|i| {
                    let m = node.value(i);
                    format!("{}:{}", m.offset, m.id)
                })
                .collect();
            writeln!(
                w,
                "  n{} [label=\"{}\"];",
                offset,
                dot_escape(&pairs.join(", "))
            )?;

            for slot in 0..node.child_count {
                let child_offset = node.child(slot);
                if child_offset >= offset {
                    continue; // malformed; children always precede parents
                }
                let label = NodeRef::parse(nodes, child_offset)
                    .map(|c| String::from_utf8_lossy(c.text(strings)).into_owned())
                    .unwrap_or_default();
                writeln!(
                    w,
                    "  n{} -> n{} [label=\"{}\"];",
                    offset,
                    child_offset,
                    dot_escape(&label)
                )?;
                stack.push(child_offset);
            }
        }

        writeln!(w, "}}")
    }
}

/// Collect every value pair stored in the subtree rooted at `offset`.
///
/// Children are serialized before their parent, so child offsets strictly
/// decrease on the way down; a record violating that is malformed and is
/// skipped, which also bounds the walk on hostile input.
fn collect_subtree(nodes: &[u8], offset: u32, out: &mut Vec<Match>) {
    let mut stack = vec![offset];
    while let Some(offset) = stack.pop() {
        let Some(node) = NodeRef::parse(nodes, offset) else {
            continue;
        };
        for i in 0..node.value_count {
            out.push(node.value(i));
        }
        for i in 0..node.child_count {
            let child = node.child(i);
            if child < offset {
                stack.push(child);
            }
        }
    }
}

#[inline]
fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Bounds-checked view of one node record within the node region.
///
/// Layout: `textOffset: u32`, `childCount: u32`, `childCount` child offsets,
/// `valueCount: u32`, `valueCount` `(offset, value)` pairs.
#[derive(Clone, Copy)]
pub(crate) struct NodeRef<'a> {
    nodes: &'a [u8],
    base: usize,
    pub(crate) child_count: usize,
    pub(crate) value_count: usize,
}

impl<'a> NodeRef<'a> {
    /// Parse the record at `offset`, or `None` if it does not fit inside the
    /// node region. A well-formed file never produces `None`; lookup treats
    /// a malformed record as absent rather than failing the query.
    pub(crate) fn parse(nodes: &'a [u8], offset: u32) -> Option<Self> {
        let base = offset as usize;
        let child_count = read_u32(nodes, base.checked_add(4)?)? as usize;
        let values_at = base.checked_add(8)?.checked_add(child_count.checked_mul(4)?)?;
        let value_count = read_u32(nodes, values_at)? as usize;
        let end = values_at
            .checked_add(4)?
            .checked_add(value_count.checked_mul(8)?)?;
        if end > nodes.len() {
            return None;
        }
        Some(Self {
            nodes,
            base,
            child_count,
            value_count,
        })
    }

    /// Size of this record in bytes
    pub(crate) fn record_len(&self) -> usize {
        12 + 4 * self.child_count + 8 * self.value_count
    }

    /// Token text, resolved through the string table. Empty for the root
    /// sentinel (and for a dangling string offset, which a valid file never
    /// contains).
    pub(crate) fn text<'s>(&self, strings: &'s [u8]) -> &'s [u8] {
        let at = read_u32(self.nodes, self.base).unwrap_or(0) as usize;
        let Some(len) = read_u32(strings, at) else {
            return &[];
        };
        strings
            .get(at + 4..at + 4 + len as usize)
            .unwrap_or(&[])
    }

    /// Offset of the `i`-th child (caller keeps `i < child_count`)
    pub(crate) fn child(&self, i: usize) -> u32 {
        read_u32(self.nodes, self.base + 8 + 4 * i).unwrap_or(0)
    }

    /// The `i`-th stored pair (caller keeps `i < value_count`)
    pub(crate) fn value(&self, i: usize) -> Match {
        let at = self.base + 12 + 4 * self.child_count + 8 * i;
        Match {
            offset: read_u32(self.nodes, at).unwrap_or(0),
            id: read_u32(self.nodes, at + 4).unwrap_or(0),
        }
    }
}

#[inline]
fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::builder::IndexBuilder;
    use crate::index::writer::IndexWriter;

    fn build(names: &[(&str, u32)]) -> IndexReader {
        let mut builder = IndexBuilder::new();
        for &(name, id) in names {
            builder.add(name, id);
        }
        IndexReader::from_bytes(IndexWriter::to_bytes(&builder)).unwrap()
    }

    fn ids(matches: &[Match]) -> Vec<u32> {
        let mut ids: Vec<u32> = matches.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    #[test]
    fn test_lookup_whole_key() {
        let reader = build(&[("System.String", 1)]);
        assert_eq!(ids(&reader.lookup("System.String")), vec![1]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let reader = build(&[("System.String", 1)]);
        assert_eq!(ids(&reader.lookup("SYSTEM.string")), vec![1]);
        assert_eq!(ids(&reader.lookup("string")), vec![1]);
    }

    #[test]
    fn test_lookup_mid_name_boundary() {
        let reader = build(&[("System.Collections.Generic.List`1", 42)]);
        // Prefix of a mid-name token suffix.
        assert_eq!(ids(&reader.lookup("Col")), vec![42]);
        assert_eq!(ids(&reader.lookup("generic.li")), vec![42]);
    }

    #[test]
    fn test_lookup_empty_query() {
        let reader = build(&[("System.String", 1)]);
        assert!(reader.lookup("").is_empty());
    }

    #[test]
    fn test_lookup_dot_finds_nothing() {
        let reader = build(&[("A.B", 7)]);
        assert!(reader.lookup(".").is_empty());
    }

    #[test]
    fn test_lookup_miss() {
        let reader = build(&[("System.String", 1)]);
        assert!(reader.lookup("zzz").is_empty());
    }

    #[test]
    fn test_lookup_spans_token_boundary() {
        // Query crossing several tokens must descend through several levels.
        let reader = build(&[("System.Collections.Generic.List`1", 42)]);
        assert_eq!(ids(&reader.lookup("collections.generic")), vec![42]);
    }

    #[test]
    fn test_subtree_collection() {
        let reader = build(&[("List", 1), ("Listener", 2), ("ListBox", 3)]);
        // "lis" is a prefix of every stored token; all three surface.
        assert_eq!(ids(&reader.lookup("lis")), vec![1, 2, 3]);
        // "listb" only reaches ListBox.
        assert_eq!(ids(&reader.lookup("listb")), vec![3]);
    }

    #[test]
    fn test_duplicate_values_survive() {
        let reader = build(&[("List", 9), ("List", 9)]);
        let matches = reader.lookup("list");
        assert_eq!(matches.len(), 2);
        assert_eq!(ids(&matches), vec![9]);
    }

    #[test]
    fn test_offset_carried_through() {
        let reader = build(&[("System.Collections.Generic.List`1", 42)]);
        let matches = reader.lookup("list");
        assert!(matches.contains(&Match { offset: 32, id: 42 }));
    }
}
