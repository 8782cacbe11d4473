// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{error::Result, metadata, resource, storage::Storage as _};

use super::Workspace;

/// Show what applying the configuration would change.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// Print the plan and its diagnostics as JSON.
    #[arg(long)]
    json: bool,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, workspace: &mut Workspace) -> Result<()> {
        let config = workspace.config().await?;
        let prior = workspace.state.get().await?;
        let plan = resource::plan(&config, prior.as_ref());

        if !self.json {
            super::report(&plan.diagnostics);
        }
        println!("{}", self.render(&plan)?);
        Ok(())
    }
}

impl Command {
    fn render(&self, plan: &resource::Plan) -> Result<String> {
        if self.json {
            Ok(serde_json::to_string_pretty(plan)?)
        } else {
            Ok(format!("{}: {}", *metadata::RESOURCE_TYPE_NAME, plan.action))
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        command::{testing::Fixture, Command as _},
        keytool::testing::FakeKeytool,
        model::DistinguishedName,
    };

    fn prior(password: &str) -> resource::State {
        resource::State {
            id: uuid::uuid!("46640aca-1245-44d2-8ca9-d19750597d6c"),
            password: SecretString::new(password.to_owned()),
            file: "AAAA".to_owned(),
            distinguished_name: DistinguishedName::default(),
        }
    }

    fn config(password: &str) -> resource::Config {
        resource::Config {
            password: SecretString::new(password.to_owned()),
            distinguished_name: DistinguishedName::default(),
        }
    }

    #[test]
    fn json_output() {
        let plan = resource::plan(&config("new"), Some(&prior("old")));

        let rendered = Command { json: true }.render(&plan).expect("render");
        let rendered: Value = serde_json::from_str(&rendered).expect("JSON plan");

        assert_eq!(
            rendered,
            json!({
                "action": "update",
                "rotate_password": true,
                "operations": ["update"],
                "diagnostics": [],
            })
        );
    }

    #[test]
    fn json_output_for_replacement() {
        let mut config = config("old");
        config.distinguished_name.common_name = Some("example.com".to_owned());
        let plan = resource::plan(&config, Some(&prior("old")));

        let rendered = Command { json: true }.render(&plan).expect("render");
        let rendered: Value = serde_json::from_str(&rendered).expect("JSON plan");

        assert_eq!(
            rendered,
            json!({
                "action": "replace",
                "attributes": ["common_name"],
                "operations": ["create", "delete"],
                "diagnostics": [],
            })
        );
    }

    #[test]
    fn text_output() {
        let plan = resource::plan(&config("changeit"), None);

        assert_eq!(
            Command { json: false }.render(&plan).expect("render"),
            "jks_keystore: create a new keystore"
        );
    }

    #[tokio::test]
    async fn plan_does_not_touch_keytool_or_state() {
        let fixture = Fixture::new(FakeKeytool::working());
        fixture.configure(&json!({ "password": "changeit" }));

        Command { json: true }
            .execute(&mut fixture.workspace())
            .await
            .expect("plan");

        assert!(fixture.fake.invocations().is_empty());
        assert!(fixture.state().await.is_none());
    }
}
