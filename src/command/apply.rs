// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::info;

use crate::{
    error::{self, Result},
    metadata,
    resource::{self, Action},
    storage::Storage as _,
};

use super::Workspace;

/// Create, update or replace the keystore so that it matches the
/// configuration.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, workspace: &mut Workspace) -> Result<()> {
        let config = workspace.config().await?;
        let prior = workspace.state.get().await?;
        let plan = resource::plan(&config, prior.as_ref());
        super::report(&plan.diagnostics);

        info!("Applying plan: {}", plan.action);
        let state = match resource::apply(&workspace.context, &config, prior, &plan.action).await {
            Ok(state) => state,
            Err(diagnostic) => {
                super::report(&[diagnostic]);
                return Err(error::Error::Command);
            }
        };

        if plan.action != Action::NoOp {
            workspace.state.update(&state).await?;
        }

        println!(
            "{} {}: {}",
            *metadata::RESOURCE_TYPE_NAME,
            state.id,
            plan.action
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;
    use serde_json::json;

    use super::*;
    use crate::{
        command::{testing::Fixture, Command as _},
        keytool::testing::FakeKeytool,
    };

    async fn apply(fixture: &Fixture) -> Result<()> {
        Command {}.execute(&mut fixture.workspace()).await
    }

    #[tokio::test]
    async fn create_then_rotate() {
        let fixture = Fixture::new(FakeKeytool::working());

        fixture.configure(&json!({
            "password": "MyPassword12345",
            "common_name": "MyCommonName",
        }));
        apply(&fixture).await.expect("create");
        let created = fixture.state().await.expect("state after create");
        assert_eq!(created.password.expose_secret(), "MyPassword12345");
        assert!(base64::decode(&created.file).expect("base64").len() > 1000);

        apply(&fixture).await.expect("no-op");
        let unchanged = fixture.state().await.expect("state after no-op");
        assert_eq!(unchanged.id, created.id);
        assert_eq!(unchanged.file, created.file);

        fixture.configure(&json!({
            "password": "MyPassword",
            "common_name": "MyCommonName",
        }));
        apply(&fixture).await.expect("update");
        let rotated = fixture.state().await.expect("state after update");
        assert_eq!(rotated.id, created.id);
        assert_ne!(rotated.file, created.file);
        assert_eq!(rotated.password.expose_secret(), "MyPassword");

        assert_eq!(fixture.fake.invocations().len(), 2);
    }

    #[tokio::test]
    async fn failure_leaves_state_untouched() {
        let fixture = Fixture::new(FakeKeytool::failing());
        fixture.configure(&json!({ "password": "changeit" }));

        let err = apply(&fixture).await.expect_err("keytool fails");

        assert!(matches!(err, error::Error::Command));
        assert!(fixture.state().await.is_none());
    }

    #[tokio::test]
    async fn missing_config() {
        let fixture = Fixture::new(FakeKeytool::working());

        let err = apply(&fixture).await.expect_err("no config");

        assert!(matches!(err, error::Error::File { .. }));
        assert!(fixture.fake.invocations().is_empty());
    }
}
