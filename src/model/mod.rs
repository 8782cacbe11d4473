// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

mod scratch;

use std::{
    fmt::{self, Write as _},
    path::{Path, PathBuf},
};

use log::debug;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::{error::Result, keytool::Keytool};

use scratch::Scratch;

const KEYSTORE_FILE_NAME: &str = "keystore.p12";
const ROTATED_KEYSTORE_FILE_NAME: &str = "keystore-rotated.p12";

/// Placeholder used by `keytool` for subject fields that were not given.
pub(crate) const UNKNOWN: &str = "Unknown";

/// Where and how keystore operations run.
#[derive(Debug, Clone, Default)]
pub(crate) struct Context {
    keytool: Keytool,
    scratch_root: Option<PathBuf>,
}

impl Context {
    pub(crate) fn new(keytool: Keytool) -> Self {
        Self {
            keytool,
            scratch_root: None,
        }
    }

    /// Creates scratch directories under the given directory instead of the
    /// system temporary directory.
    pub(crate) fn with_scratch_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.scratch_root = Some(root.as_ref().to_owned());
        self
    }

    fn scratch(&self) -> Result<Scratch> {
        Scratch::new(self.scratch_root.as_deref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DistinguishedName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) common_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) organizational_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) country: Option<String>,
}

impl DistinguishedName {
    /// The subject fields in the order `keytool` prints them.
    fn components(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("CN", self.common_name.as_deref()),
            ("OU", self.organizational_unit.as_deref()),
            ("O", self.organization.as_deref()),
            ("L", self.locality.as_deref()),
            ("S", self.state.as_deref()),
            ("C", self.country.as_deref()),
        ]
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        let leading_or_trailing_space = c == ' ' && (i == 0 || i == last);
        if matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';')
            || (c == '#' && i == 0)
            || leading_or_trailing_space
        {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    Ok(())
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.components().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}=")?;
            write_escaped(f, value.filter(|v| !v.is_empty()).unwrap_or(UNKNOWN))?;
        }
        Ok(())
    }
}

/// A keystore as it is handed between the resource and `keytool`.
#[derive(Debug, Clone)]
pub(crate) struct KeystoreModel {
    pub(crate) password: SecretString,
    pub(crate) distinguished_name: DistinguishedName,
    pub(crate) base64_text: String,
}

impl KeystoreModel {
    pub(crate) fn new(password: SecretString, distinguished_name: DistinguishedName) -> Self {
        Self {
            password,
            distinguished_name,
            base64_text: String::new(),
        }
    }

    /// Generates a brand new keystore and returns its contents encoded as
    /// base64.
    pub(crate) async fn create_keystore_base64(&self, ctx: &Context) -> Result<String> {
        let scratch = ctx.scratch()?;
        let keystore = scratch.path(KEYSTORE_FILE_NAME);

        ctx.keytool
            .generate_keypair(&keystore, &self.password, &self.distinguished_name)
            .await?;

        let bytes = scratch.read(&keystore).await?;
        scratch.remove(&keystore).await?;
        scratch.close()?;

        debug!("Generated keystore of {} bytes", bytes.len());
        Ok(base64::encode(bytes))
    }

    /// Re-encrypts this keystore under a new password and returns the result
    /// encoded as base64. The stored text is decoded before `keytool` runs, so
    /// corrupted state never reaches it.
    pub(crate) async fn update_keystore_base64(
        &self,
        ctx: &Context,
        new_password: &SecretString,
    ) -> Result<String> {
        let decoded = base64::decode(&self.base64_text)?;

        let scratch = ctx.scratch()?;
        let source = scratch.path(KEYSTORE_FILE_NAME);
        let destination = scratch.path(ROTATED_KEYSTORE_FILE_NAME);

        scratch.write(&source, &decoded).await?;
        ctx.keytool
            .import_keystore(&source, &self.password, &destination, new_password)
            .await?;
        scratch.remove(&source).await?;

        let bytes = scratch.read(&destination).await?;
        scratch.remove(&destination).await?;
        scratch.close()?;

        debug!("Re-encrypted keystore of {} bytes", bytes.len());
        Ok(base64::encode(bytes))
    }
}
