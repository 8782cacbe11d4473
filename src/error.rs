// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    io,
    path::{Path, PathBuf},
    process::ExitStatus,
    result,
};

use thiserror::Error;

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("file operation on {} failed: {source}", .path.display())]
    File { path: PathBuf, source: io::Error },
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("stored keystore is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("keytool error: {0}")]
    Keytool(#[from] Keytool),
    #[error("configuration error: {0}")]
    Config(#[from] Config),
    #[error("state error: {0}")]
    State(#[from] State),
    #[error("command execution failed")]
    Command,
}

impl Error {
    /// Attaches the path of the file being operated on to an I/O error.
    pub(crate) fn file(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::File {
            path: path.to_owned(),
            source,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

#[derive(Error, Debug)]
pub(crate) enum Keytool {
    #[error("could not run {program} (is the keytool utility installed on this machine?): {source}")]
    Spawn { program: String, source: io::Error },
    #[error("{operation} exited unsuccessfully ({status})\nOutput: {output}")]
    Status {
        operation: &'static str,
        status: ExitStatus,
        output: String,
    },
}

#[derive(Error, Debug)]
pub(crate) enum State {
    #[error("no keystore resource exists in the state")]
    Missing,
}

#[derive(Error, Debug)]
pub(crate) enum Config {
    #[error(r#"unsupported attribute "{}""#, .0.escape_default())]
    Unsupported(String),
    #[error(r#"attribute "{}" is computed and cannot be configured"#, .0.escape_default())]
    Computed(String),
    #[error("{0}")]
    Invalid(serde_json::Error),
}
