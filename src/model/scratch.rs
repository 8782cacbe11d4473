// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;
use tokio::fs;

use crate::error::{Error, Result};

/// A private, uniquely named directory holding the keystore files of a single
/// operation.
///
/// Dropping a scratch directory removes it and anything left inside on a
/// best-effort basis; [`Scratch::close`] does the same but reports failures.
pub(crate) struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub(crate) fn new(root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        let _ = builder.prefix(".jks-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root).map_err(Error::file(root))?,
            None => builder.tempdir()?,
        };
        debug!("Created scratch directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub(crate) fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub(crate) async fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents).await.map_err(Error::file(path))
    }

    pub(crate) async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).await.map_err(Error::file(path))
    }

    pub(crate) async fn remove(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(Error::file(path))
    }

    pub(crate) fn close(self) -> Result<()> {
        let path = self.dir.path().to_owned();
        self.dir.close().map_err(|e| {
            warn!("Could not remove scratch directory {}: {}", path.display(), e);
            Error::file(&path)(e)
        })
    }
}
