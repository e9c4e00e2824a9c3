//! Catalog input boundary.
//!
//! The crawler hands the index one `(displayName, id)` pair per cataloged
//! API, serialized as one JSON object per line. Accessor-only members are
//! excluded on the producer side before they ever reach this file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::index::ApiId;

/// One cataloged API: the fully qualified, rendered signature text and its
/// dense id within the current catalog generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEntry {
    pub name: String,
    pub id: ApiId,
}

/// Read a JSONL catalog file into memory.
pub fn read_catalog(path: &Path) -> Result<Vec<ApiEntry>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open catalog {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: ApiEntry = serde_json::from_str(&line)
            .with_context(|| format!("Bad catalog entry on line {}", line_no + 1))?;
        entries.push(entry);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"name": "System.String", "id": 1}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"name": "System.Int32", "id": 2}}"#).unwrap();

        let entries = read_catalog(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "System.String");
        assert_eq!(entries[1].id, 2);
    }

    #[test]
    fn test_bad_line_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        assert!(read_catalog(file.path()).is_err());
    }
}
