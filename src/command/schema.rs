// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{error::Result, resource};

use super::Workspace;

/// Print the schema of the keystore resource as JSON.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, _workspace: &mut Workspace) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(&resource::schema::schema())?
        );
        Ok(())
    }
}
