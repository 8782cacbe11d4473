// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::error;
use tabled::{settings::Style, Table, Tabled};

use crate::{
    error::{self, Result},
    metadata,
    resource::{self, schema},
    storage::Storage as _,
};

use super::Workspace;

#[derive(Clone, Debug, Tabled)]
struct Row {
    #[tabled(rename = "Attribute")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn rows(state: &resource::State) -> Vec<Row> {
    schema::ATTRIBUTES
        .iter()
        .filter_map(|attribute| {
            state.attribute(attribute.name).map(|value| Row {
                name: attribute.name,
                value: if attribute.sensitive {
                    "⋆⋆⋆⋆⋆⋆⋆⋆⋆⋆".to_owned()
                } else {
                    value
                },
            })
        })
        .collect()
}

/// Print the recorded state of the keystore.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// Print only the value of the given attribute, unmasked. Use `file` to
    /// get the base64-encoded keystore.
    #[arg(long, short, conflicts_with = "raw")]
    attribute: Option<String>,

    /// Print the whole state as JSON, including sensitive values.
    #[arg(long)]
    raw: bool,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, workspace: &mut Workspace) -> Result<()> {
        let Some(state) = workspace.state.get().await? else {
            error!("There is no {} in the state", *metadata::RESOURCE_TYPE_NAME);
            return Err(error::State::Missing.into());
        };

        if self.raw {
            println!("{}", serde_json::to_string_pretty(&state)?);
        } else if let Some(name) = self.attribute {
            match state.attribute(&name) {
                Some(value) => println!("{value}"),
                None if schema::attribute(&name).is_some() => {
                    error!("The attribute {} is not set", name);
                    return Err(error::Error::Command);
                }
                None => {
                    error!("No attribute named {}", name);
                    return Err(error::Error::Command);
                }
            }
        } else {
            println!("{}", Table::new(rows(&state)).with(Style::rounded()));
        }
        Ok(())
    }
}
