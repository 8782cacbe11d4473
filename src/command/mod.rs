// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{error, warn};

use crate::{
    error::Result,
    model,
    resource::{self, Diagnostic, Severity},
    storage::Storage,
};

pub(crate) mod apply;
pub(crate) mod destroy;
pub(crate) mod plan;
pub(crate) mod schema;
pub(crate) mod show;

/// Everything a command needs to find and manage the keystore resource.
pub(crate) struct Workspace {
    context: model::Context,
    config: PathBuf,
    state: Box<dyn Storage<resource::State>>,
}

impl Workspace {
    pub(crate) fn new<P: AsRef<Path>>(
        context: model::Context,
        config: P,
        state: Box<dyn Storage<resource::State>>,
    ) -> Self {
        Self {
            context,
            config: config.as_ref().to_owned(),
            state,
        }
    }

    async fn config(&self) -> Result<resource::Config> {
        resource::Config::load(&self.config).await
    }
}

fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Error => error!("{}", diagnostic),
            Severity::Warning => warn!("{}", diagnostic),
        }
    }
}

#[async_trait]
pub(crate) trait Command {
    async fn execute(self, workspace: &mut Workspace) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{fs, path::PathBuf};

    use serde_json::Value;
    use tempfile::TempDir;

    use super::Workspace;
    use crate::{
        keytool::testing::FakeKeytool, model::Context, resource, storage, storage::Storage as _,
    };

    /// A workspace whose configuration and state live in a temporary
    /// directory and whose keystores come from a fake `keytool`.
    pub(crate) struct Fixture {
        pub(crate) fake: FakeKeytool,
        dir: TempDir,
    }

    impl Fixture {
        pub(crate) fn new(fake: FakeKeytool) -> Self {
            Self {
                fake,
                dir: TempDir::new().expect("temporary directory"),
            }
        }

        fn config_path(&self) -> PathBuf {
            self.dir.path().join("keystore.json")
        }

        fn state_path(&self) -> PathBuf {
            self.dir.path().join("terraform.tfstate.json")
        }

        pub(crate) fn configure(&self, config: &Value) {
            fs::write(self.config_path(), config.to_string()).expect("write config");
        }

        pub(crate) fn workspace(&self) -> Workspace {
            Workspace::new(
                Context::new(self.fake.keytool()),
                self.config_path(),
                Box::new(storage::File::new(self.state_path())),
            )
        }

        pub(crate) async fn state(&self) -> Option<resource::State> {
            storage::File::new(self.state_path())
                .get()
                .await
                .expect("read state")
        }
    }
}
