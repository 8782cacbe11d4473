// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::warn;

use crate::{error::Result, metadata, resource, storage::Storage as _};

use super::Workspace;

/// Forget the keystore, removing it from state.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, workspace: &mut Workspace) -> Result<()> {
        let Some(prior) = workspace.state.get().await? else {
            warn!("There is no {} to destroy", *metadata::RESOURCE_TYPE_NAME);
            return Ok(());
        };

        let id = prior.id;
        resource::delete(prior);
        workspace.state.clear().await?;

        println!("{} {}: destroyed", *metadata::RESOURCE_TYPE_NAME, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        command::{apply, testing::Fixture, Command as _},
        keytool::testing::FakeKeytool,
    };

    #[tokio::test]
    async fn destroy_clears_state() {
        let fixture = Fixture::new(FakeKeytool::working());
        fixture.configure(&json!({ "password": "changeit" }));

        apply::Command {}
            .execute(&mut fixture.workspace())
            .await
            .expect("apply");
        assert!(fixture.state().await.is_some());

        Command {}
            .execute(&mut fixture.workspace())
            .await
            .expect("destroy");
        assert!(fixture.state().await.is_none());

        Command {}
            .execute(&mut fixture.workspace())
            .await
            .expect("destroying nothing");
    }
}
