//! Types and binary format definitions for the token-suffix index.
//!
//! An index file is one contiguous buffer with three regions:
//!
//! - Header (26 bytes): magic, format version, region descriptors, root offset
//! - String table: length-prefixed UTF-8 token texts, each distinct text once
//! - Node table: fixed-shape node records referencing strings and child nodes
//!
//! All integers are little-endian. Node and root offsets are relative to the
//! start of the node region; string offsets are relative to the start of the
//! string region.

use std::io::{self, Write};

use thiserror::Error;

/// Identifier of one API within one catalog generation
pub type ApiId = u32;

/// Magic bytes: "APSX" in ASCII
pub const MAGIC: [u8; 4] = *b"APSX";

/// Current format version
pub const VERSION: u16 = 1;

/// One stored `(offset, value)` pair.
///
/// `offset` is the character position of the key's final token within the
/// original display name. It is carried through for callers (e.g. result
/// highlighting) and never interpreted by the index itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub offset: u32,
    pub id: ApiId,
}

/// Index file header (26 bytes fixed size)
#[derive(Debug, Clone, Copy)]
pub struct IndexHeader {
    /// Byte offset of the string region (always `IndexHeader::SIZE`)
    pub strings_start: u32,
    /// Length of the string region in bytes
    pub strings_len: u32,
    /// Byte offset of the node region (always `strings_start + strings_len`)
    pub nodes_start: u32,
    /// Length of the node region in bytes
    pub nodes_len: u32,
    /// Offset of the root node record, relative to the node region
    pub root_offset: u32,
}

impl IndexHeader {
    /// Size of the header in bytes
    // 4 (magic) + 2 (version) + 5*4 (regions + root) = 26
    pub const SIZE: usize = 26;

    /// Build a header for the given region lengths and root offset
    pub fn new(strings_len: u32, nodes_len: u32, root_offset: u32) -> Self {
        Self {
            strings_start: Self::SIZE as u32,
            strings_len,
            nodes_start: Self::SIZE as u32 + strings_len,
            nodes_len,
            root_offset,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4..6].copy_from_slice(&VERSION.to_le_bytes());
        buf[6..10].copy_from_slice(&self.strings_start.to_le_bytes());
        buf[10..14].copy_from_slice(&self.strings_len.to_le_bytes());
        buf[14..18].copy_from_slice(&self.nodes_start.to_le_bytes());
        buf[18..22].copy_from_slice(&self.nodes_len.to_le_bytes());
        buf[22..26].copy_from_slice(&self.root_offset.to_le_bytes());
        buf
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Parse and validate a header against the full buffer.
    ///
    /// This is the all-or-nothing load gate: any violation fails the whole
    /// load, there is no partial or degraded reader.
    pub fn read(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < Self::SIZE {
            return Err(FormatError::Truncated);
        }
        if data[0..4] != MAGIC {
            return Err(FormatError::BadMagic);
        }

        let version = u16::from_le_bytes([data[4], data[5]]);
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }

        let strings_start = read_u32(data, 6);
        let strings_len = read_u32(data, 10);
        let nodes_start = read_u32(data, 14);
        let nodes_len = read_u32(data, 18);
        let root_offset = read_u32(data, 22);

        if strings_start != Self::SIZE as u32 {
            return Err(FormatError::BadLayout(
                "string region must start right after the header",
            ));
        }
        let strings_end = strings_start
            .checked_add(strings_len)
            .ok_or(FormatError::BadLayout("string region overflows"))?;
        if nodes_start != strings_end {
            return Err(FormatError::BadLayout(
                "node region must start right after the string region",
            ));
        }
        let nodes_end = nodes_start
            .checked_add(nodes_len)
            .ok_or(FormatError::BadLayout("node region overflows"))?;
        if nodes_end as usize > data.len() {
            return Err(FormatError::Truncated);
        }
        if root_offset >= nodes_len {
            return Err(FormatError::BadRoot(root_offset));
        }

        Ok(Self {
            strings_start,
            strings_len,
            nodes_start,
            nodes_len,
            root_offset,
        })
    }
}

#[inline]
fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Load-time validation failure.
///
/// Any of these makes the file unusable for this reader version; the caller
/// is expected to treat the failure as fatal for the whole catalog run.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to read index file: {0}")]
    Io(#[from] io::Error),

    #[error("not an index file (bad magic)")]
    BadMagic,

    #[error("unsupported index version {0} (expected {VERSION})")]
    UnsupportedVersion(u16),

    #[error("index file is truncated")]
    Truncated,

    #[error("inconsistent region layout: {0}")]
    BadLayout(&'static str),

    #[error("root offset {0} falls outside the node region")]
    BadRoot(u32),
}
