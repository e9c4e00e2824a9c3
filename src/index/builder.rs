//! In-memory index builder.
//!
//! Builds a compressed trie over token sequences, one display name at a
//! time. For every non-`"."` token boundary of a name, the token suffix
//! starting there is inserted as its own path, so a query can match the name
//! starting at any of those boundaries. The full data set is never needed in
//! advance.
//!
//! Building is single-threaded: `add` mutates unsynchronized child lists
//! behind `&mut self`, and the caller feeds names sequentially.

use std::io::{self, Write};

use crate::index::types::{ApiId, Match};
use crate::utils::tokenize;

/// One trie node: a token position reached along some inserted suffix.
#[derive(Debug, Default)]
pub(crate) struct Node {
    /// Token text (empty only for the root sentinel)
    pub(crate) text: String,
    /// Children, sorted by byte-ordinal text at all times
    pub(crate) children: Vec<Node>,
    /// Pairs attached when this node terminates an inserted key
    pub(crate) values: Vec<Match>,
}

impl Node {
    fn new(text: String) -> Self {
        Self {
            text,
            children: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Find or insert the child for `token`, keeping children sorted.
    fn child_mut(&mut self, token: &str) -> &mut Node {
        let slot = match self
            .children
            .binary_search_by(|c| c.text.as_str().cmp(token))
        {
            Ok(i) => i,
            Err(i) => {
                self.children.insert(i, Node::new(token.to_string()));
                i
            }
        };
        &mut self.children[slot]
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

/// Mutable, build-time token-suffix trie.
///
/// Lifecycle: empty → repeated [`add`](Self::add) → serialized once via
/// [`IndexWriter`](crate::index::IndexWriter) → discarded. There is no way
/// back from a serialized index to a builder; a replacement index is always
/// built from scratch.
pub struct IndexBuilder {
    root: Node,
    key_count: usize,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            root: Node::default(),
            key_count: 0,
        }
    }

    /// Insert one `(displayName, id)` pair.
    ///
    /// Token text is lowercased before insertion; queries are lowercased the
    /// same way at lookup time. Repeated calls with the same name or id are
    /// legal and simply accumulate more `(offset, value)` pairs.
    pub fn add(&mut self, name: &str, id: ApiId) {
        let tokens = tokenize(name);
        if tokens.is_empty() {
            return;
        }

        // Char offset of the final token in the original name; tokens
        // concatenate back to the input, so the sum is exact.
        let offset: u32 = tokens[..tokens.len() - 1]
            .iter()
            .map(|t| t.chars().count() as u32)
            .sum();

        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();

        for start in 0..lowered.len() {
            if lowered[start] == "." {
                continue;
            }
            let mut node = &mut self.root;
            for token in &lowered[start..] {
                node = node.child_mut(token);
            }
            node.values.push(Match { offset, id });
        }

        self.key_count += 1;
    }

    /// Number of keys inserted so far
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Number of trie nodes, including the root sentinel
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    pub(crate) fn root(&self) -> &Node {
        &self.root
    }

    /// Export the tree shape as a Graphviz digraph for visual debugging.
    ///
    /// Nodes are labeled with their stored `(offset, value)` pairs, edges
    /// with the child's token text. Not used on any production query path.
    pub fn write_dot<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "digraph index {{")?;
        let mut next_id = 0usize;
        write_dot_node(&self.root, &mut next_id, w)?;
        writeln!(w, "}}")
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn write_dot_node<W: Write>(node: &Node, next_id: &mut usize, w: &mut W) -> io::Result<usize> {
    let id = *next_id;
    *next_id += 1;

    let pairs: Vec<String> = node
        .values
        .iter()
        .map(|m| format!("{}:{}", m.offset, m.id))
        .collect();
    writeln!(w, "  n{} [label=\"{}\"];", id, dot_escape(&pairs.join(", ")))?;

    for child in &node.children {
        let child_id = write_dot_node(child, next_id, w)?;
        writeln!(
            w,
            "  n{} -> n{} [label=\"{}\"];",
            id,
            child_id,
            dot_escape(&child.text)
        )?;
    }

    Ok(id)
}

pub(crate) fn dot_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
