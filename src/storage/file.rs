// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Error, Result};

use super::Storage;

/// Keeps state as a JSON document on disk.
pub(crate) struct File {
    path: PathBuf,
}

impl File {
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }
}

#[async_trait]
impl<T: Send + Serialize + Sync + for<'de> Deserialize<'de>> Storage<T> for File {
    async fn get(&mut self) -> Result<Option<T>> {
        match fs::read(&self.path).await {
            Ok(contents) => Ok(Some(serde_json::from_slice::<T>(&contents)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::file(&self.path)(e)),
        }
    }

    async fn update(&mut self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(Error::file(parent))?;
        }

        // Write next to the destination and rename so an interrupted write
        // never leaves a truncated state file behind.
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, serde_json::to_vec_pretty(data)?)
            .await
            .map_err(Error::file(&staging))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(Error::file(&self.path))?;

        debug!("Wrote state to {}", self.path.display());
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::file(&self.path)(e)),
        }
    }
}
