//! Index serialization.
//!
//! One post-order pass over the builder's trie produces the two variable
//! regions: token texts are deduplicated into the string table (first
//! occurrence wins), and one fixed-shape record per node is appended to the
//! node table. Children are emitted before their parent so every child
//! offset is known when the parent record is written; the root record
//! therefore lands last and its offset goes into the header.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::index::builder::{IndexBuilder, Node};
use crate::index::types::IndexHeader;

/// Serializes an [`IndexBuilder`] into the binary index format.
pub struct IndexWriter;

impl IndexWriter {
    /// Write the index into any byte sink, region by region.
    ///
    /// The output is a complete, standalone reader input; no external state
    /// is needed to interpret it.
    pub fn write<W: Write>(builder: &IndexBuilder, w: &mut W) -> io::Result<()> {
        let regions = Regions::build(builder);
        let header = IndexHeader::new(
            regions.strings.len() as u32,
            regions.nodes.len() as u32,
            regions.root_offset,
        );

        header.write(w)?;
        w.write_all(&regions.strings)?;
        w.write_all(&regions.nodes)?;
        Ok(())
    }

    /// Serialize into one contiguous buffer.
    pub fn to_bytes(builder: &IndexBuilder) -> Vec<u8> {
        let regions = Regions::build(builder);
        let header = IndexHeader::new(
            regions.strings.len() as u32,
            regions.nodes.len() as u32,
            regions.root_offset,
        );

        let mut out =
            Vec::with_capacity(IndexHeader::SIZE + regions.strings.len() + regions.nodes.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&regions.strings);
        out.extend_from_slice(&regions.nodes);
        out
    }

    /// Write the index to a file.
    pub fn write_to_file(builder: &IndexBuilder, path: &Path) -> io::Result<()> {
        let mut file = BufWriter::with_capacity(65536, File::create(path)?);
        Self::write(builder, &mut file)?;
        file.flush()
    }
}

/// The two variable regions plus the root record's offset.
struct Regions {
    strings: Vec<u8>,
    nodes: Vec<u8>,
    root_offset: u32,
}

impl Regions {
    fn build(builder: &IndexBuilder) -> Self {
        let mut strings = Vec::new();
        let mut nodes = Vec::new();
        let mut interned: FxHashMap<&str, u32> = FxHashMap::default();

        let root_offset = serialize_node(builder.root(), &mut strings, &mut nodes, &mut interned);

        Regions {
            strings,
            nodes,
            root_offset,
        }
    }
}

/// Append `node` (children first) and return its offset in the node region.
fn serialize_node<'a>(
    node: &'a Node,
    strings: &mut Vec<u8>,
    nodes: &mut Vec<u8>,
    interned: &mut FxHashMap<&'a str, u32>,
) -> u32 {
    let child_offsets: Vec<u32> = node
        .children
        .iter()
        .map(|child| serialize_node(child, strings, nodes, interned))
        .collect();

    let text_offset = *interned.entry(node.text.as_str()).or_insert_with(|| {
        let offset = strings.len() as u32;
        strings.extend_from_slice(&(node.text.len() as u32).to_le_bytes());
        strings.extend_from_slice(node.text.as_bytes());
        offset
    });

    let offset = nodes.len() as u32;
    nodes.extend_from_slice(&text_offset.to_le_bytes());
    nodes.extend_from_slice(&(node.children.len() as u32).to_le_bytes());
    for child_offset in child_offsets {
        nodes.extend_from_slice(&child_offset.to_le_bytes());
    }
    nodes.extend_from_slice(&(node.values.len() as u32).to_le_bytes());
    for m in &node.values {
        nodes.extend_from_slice(&m.offset.to_le_bytes());
        nodes.extend_from_slice(&m.id.to_le_bytes());
    }

    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::{IndexHeader, MAGIC, VERSION};

    #[test]
    fn test_empty_index_layout() {
        let builder = IndexBuilder::new();
        let bytes = IndexWriter::to_bytes(&builder);

        // Header + one empty string entry + one root record with no
        // children and no values.
        assert_eq!(bytes.len(), IndexHeader::SIZE + 4 + 12);
        assert_eq!(&bytes[0..4], &MAGIC);
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), VERSION);

        let header = IndexHeader::read(&bytes).unwrap();
        assert_eq!(header.strings_len, 4);
        assert_eq!(header.nodes_len, 12);
        assert_eq!(header.root_offset, 0);
    }

    #[test]
    fn test_root_record_is_last() {
        let mut builder = IndexBuilder::new();
        builder.add("A.B", 1);

        let bytes = IndexWriter::to_bytes(&builder);
        let header = IndexHeader::read(&bytes).unwrap();

        // Post-order: the root is always the final record. The root has two
        // children here ("a" and "b"), no values, so its record is
        // textOffset + childCount + 2 offsets + valueCount = 20 bytes.
        let record_len = 4 + 4 + 4 * 2 + 4;
        assert_eq!(header.root_offset as usize, header.nodes_len as usize - record_len);
    }

    #[test]
    fn test_string_table_dedup() {
        let mut builder = IndexBuilder::new();
        // "list" appears on two distinct paths but must be stored once.
        builder.add("A.List", 1);
        builder.add("B.List", 2);

        let bytes = IndexWriter::to_bytes(&builder);
        let header = IndexHeader::read(&bytes).unwrap();
        let strings = &bytes[header.strings_start as usize
            ..(header.strings_start + header.strings_len) as usize];

        let mut texts = Vec::new();
        let mut pos = 0usize;
        while pos + 4 <= strings.len() {
            let len = u32::from_le_bytes(strings[pos..pos + 4].try_into().unwrap()) as usize;
            texts.push(String::from_utf8(strings[pos + 4..pos + 4 + len].to_vec()).unwrap());
            pos += 4 + len;
        }

        let list_count = texts.iter().filter(|t| t.as_str() == "list").count();
        assert_eq!(list_count, 1);
        // "." appears in both names but is stored once too.
        let dot_count = texts.iter().filter(|t| t.as_str() == ".").count();
        assert_eq!(dot_count, 1);
    }

    #[test]
    fn test_write_matches_to_bytes() {
        let mut builder = IndexBuilder::new();
        builder.add("System.String", 3);

        let mut streamed = Vec::new();
        IndexWriter::write(&builder, &mut streamed).unwrap();
        assert_eq!(streamed, IndexWriter::to_bytes(&builder));
    }
}
