//! Path hierarchy reconstruction.
//!
//! The backend only answers "list the direct children of a path", so the
//! hierarchy below a root is rebuilt by listing recursively. Namespaces
//! without any reachable leaf are pruned, which hides stale entries left
//! behind by deletions.

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tracing::debug;

use super::store::SecretStore;
use crate::errors::{Result, SafeError};

/// Deepest namespace nesting accepted before the listing is treated as cyclic
pub const MAX_TREE_DEPTH: usize = 64;

/// One element of the reconstructed hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Display name: the root path for the root, the bare segment otherwise
    pub name: String,

    /// Full slash-delimited path
    pub path: String,

    pub children: Vec<Node>,
}

impl Node {
    pub fn new<N: Into<String>, P: Into<String>>(name: N, path: P) -> Self {
        Self { name: name.into(), path: path.into(), children: Vec::new() }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Lazily yield fully qualified leaf paths in pre-order, joining node names with `separator`.
    ///
    /// A childless root yields its own name.
    pub fn paths<'a>(&'a self, separator: &'a str) -> Paths<'a> {
        Paths { separator, stack: vec![(self, String::new())] }
    }

    /// Number of leaves below (or at) this node
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(Node::leaf_count).sum()
        }
    }

    /// Render the hierarchy with box-drawing connectors
    pub fn draw(&self) -> String {
        let mut out = format!("{}\n", self.name);
        draw_children(&self.children, "", &mut out);
        out
    }
}

fn draw_children(children: &[Node], indent: &str, out: &mut String) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        out.push_str(indent);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&child.name);
        out.push('\n');

        let nested = format!("{}{}", indent, if last { "    " } else { "│   " });
        draw_children(&child.children, &nested, out);
    }
}

/// Pre-order iterator over leaf paths, see [`Node::paths`]
pub struct Paths<'a> {
    separator: &'a str,
    stack: Vec<(&'a Node, String)>,
}

impl<'a> Iterator for Paths<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some((node, prefix)) = self.stack.pop() {
            let full = if prefix.is_empty() {
                node.name.clone()
            } else {
                format!("{}{}{}", prefix, self.separator, node.name)
            };

            if node.is_leaf() {
                return Some(full);
            }

            for child in node.children.iter().rev() {
                self.stack.push((child, full.clone()));
            }
        }
        None
    }
}

/// Builds [`Node`] trees from repeated listings
pub struct TreeBuilder<'a, S: SecretStore + ?Sized> {
    store: &'a S,
    max_depth: usize,
}

impl<'a, S: SecretStore + ?Sized> TreeBuilder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store, max_depth: MAX_TREE_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Names directly below `path`; names ending in `/` are sub-namespaces
    pub async fn list_children(&self, path: &str) -> Result<Vec<String>> {
        self.store.list(path).await
    }

    /// Rebuild the hierarchy rooted at `path`.
    ///
    /// Any listing error aborts the whole build.
    pub async fn tree(&self, path: &str) -> Result<Node> {
        let root = path.trim_end_matches('/');
        self.build(root.to_string(), root.to_string(), 0).await
    }

    fn build(&self, name: String, path: String, depth: usize) -> BoxFuture<'_, Result<Node>> {
        async move {
            if depth > self.max_depth {
                return Err(SafeError::malformed(format!(
                    "namespace nesting below '{}' exceeds {} levels",
                    path, self.max_depth
                )));
            }

            let entries = self.list_children(&path).await?;
            debug!(path = %path, entries = entries.len(), "listed namespace");

            let mut node = Node::new(name, path.clone());
            for entry in entries {
                match entry.strip_suffix('/') {
                    Some("") => continue,
                    Some(namespace) => {
                        let child_path = format!("{}/{}", path, namespace);
                        let child = self.build(namespace.to_string(), child_path, depth + 1).await?;
                        if !child.is_leaf() {
                            node.children.push(child);
                        }
                    }
                    None if entry.is_empty() => continue,
                    None => {
                        let child_path = format!("{}/{}", path, entry);
                        node.children.push(Node::new(entry, child_path));
                    }
                }
            }
            Ok(node)
        }
        .boxed()
    }
}
