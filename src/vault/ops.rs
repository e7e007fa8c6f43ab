//! Recursive delete, move and copy.
//!
//! Bulk operations walk the pre-order leaf sequence of a rebuilt tree and
//! stop at the first failure. Nothing is rolled back: leaves already
//! deleted stay deleted, and a move whose delete fails leaves the secret
//! at both the source and the destination.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::secret::Secret;
use super::store::SecretStore;
use super::tree::TreeBuilder;
use crate::errors::Result;

/// Per-path operation applied by [`TreeOps::move_copy_tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOp {
    Copy,
    /// Copy, then delete the source
    Move,
}

impl std::fmt::Display for TreeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeOp::Copy => write!(f, "copy"),
            TreeOp::Move => write!(f, "move"),
        }
    }
}

/// Tree-wide operations over a [`SecretStore`]
pub struct TreeOps<'a, S: SecretStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: SecretStore + ?Sized> TreeOps<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Read `src` and write it to `dst`
    pub async fn copy(&self, src: &str, dst: &str) -> Result<()> {
        let secret = self.store.read(src).await?;
        self.store.write(dst, &secret).await
    }

    /// Copy `src` to `dst`, then delete `src`.
    ///
    /// Not atomic: a failed delete leaves the secret readable at both paths.
    pub async fn move_secret(&self, src: &str, dst: &str) -> Result<()> {
        self.copy(src, dst).await?;
        self.store.delete(src).await
    }

    /// Apply `op` to one path pair
    pub async fn apply(&self, op: TreeOp, src: &str, dst: &str) -> Result<()> {
        debug!(%op, src, dst, "applying");
        match op {
            TreeOp::Copy => self.copy(src, dst).await,
            TreeOp::Move => self.move_secret(src, dst).await,
        }
    }

    /// Delete every leaf below `root` in pre-order, then `root` itself.
    ///
    /// Returns the number of delete calls issued.
    pub async fn delete_tree(&self, root: &str) -> Result<usize> {
        let root = root.trim_end_matches('/');
        let tree = TreeBuilder::new(self.store).tree(root).await?;

        let mut deleted = 0;
        for path in tree.paths("/") {
            self.store.delete(&path).await?;
            deleted += 1;
        }
        self.store.delete(root).await?;
        deleted += 1;

        info!(root, deleted, "deleted tree");
        Ok(deleted)
    }

    /// Apply `op` to every leaf below `old_root`, mapping each path onto `new_root`.
    ///
    /// The destination replaces the first occurrence of `old_root` in the
    /// leaf path. Afterwards, if `old_root` itself still reads as anything
    /// other than absent, `op(old_root, new_root)` runs as well. Returns the
    /// number of operations applied.
    pub async fn move_copy_tree(&self, old_root: &str, new_root: &str, op: TreeOp) -> Result<usize> {
        let old_root = old_root.trim_end_matches('/');
        let new_root = new_root.trim_end_matches('/');
        let tree = TreeBuilder::new(self.store).tree(old_root).await?;

        let mut applied = 0;
        for path in tree.paths("/") {
            let destination = path.replacen(old_root, new_root, 1);
            self.apply(op, &path, &destination).await?;
            applied += 1;
        }

        match self.store.read(old_root).await {
            Err(e) if e.is_not_found() => {}
            _ => {
                self.apply(op, old_root, new_root).await?;
                applied += 1;
            }
        }

        info!(%op, old_root, new_root, applied, "processed tree");
        Ok(applied)
    }

    /// Read every leaf below each root into a path-keyed map
    pub async fn export(&self, roots: &[String]) -> Result<BTreeMap<String, Secret>> {
        let mut data = BTreeMap::new();
        for root in roots {
            let tree = TreeBuilder::new(self.store).tree(root).await?;
            for path in tree.paths("/") {
                let secret = self.store.read(&path).await?;
                data.insert(path, secret);
            }
        }
        Ok(data)
    }

    /// Write every exported secret back to its path, stopping at the first failure
    pub async fn import(&self, data: &BTreeMap<String, Secret>) -> Result<usize> {
        let mut written = 0;
        for (path, secret) in data {
            self.store.write(path, secret).await?;
            info!(path = %path, "wrote secret");
            written += 1;
        }
        Ok(written)
    }
}
