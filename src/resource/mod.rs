// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The `jks_keystore` resource: its configuration, its persisted state and
//! the lifecycle operations that move between them.

pub(crate) mod schema;

use std::{fmt, path::Path};

use log::{debug, info};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use subtle::ConstantTimeEq as _;
use tokio::fs;
use uuid::Uuid;

use crate::{
    error::{self, Error, Result},
    model::{Context, DistinguishedName, KeystoreModel},
    rng,
};

use schema::PlanModifier;

#[derive(Deserialize)]
struct ConfigDocument {
    password: SecretString,
    #[serde(flatten)]
    distinguished_name: DistinguishedName,
}

/// The declarative configuration of a keystore. Only attributes the schema
/// lets a user set are accepted.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub(crate) struct Config {
    pub(crate) password: SecretString,
    pub(crate) distinguished_name: DistinguishedName,
}

impl Config {
    pub(crate) async fn load(path: &Path) -> Result<Self> {
        let contents = fs::read(path).await.map_err(Error::file(path))?;
        let document: Map<String, Value> = serde_json::from_slice(&contents)?;
        Ok(Self::try_from(document)?)
    }
}

impl TryFrom<Map<String, Value>> for Config {
    type Error = error::Config;

    fn try_from(document: Map<String, Value>) -> Result<Self, Self::Error> {
        for name in document.keys() {
            match schema::attribute(name) {
                None => return Err(error::Config::Unsupported(name.clone())),
                Some(attribute) if attribute.computed => {
                    return Err(error::Config::Computed(name.clone()));
                }
                Some(_) => {}
            }
        }

        let document: ConfigDocument =
            serde_json::from_value(Value::Object(document)).map_err(error::Config::Invalid)?;
        Ok(Self {
            password: document.password,
            distinguished_name: document.distinguished_name,
        })
    }
}

fn serialize_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// A keystore as recorded in state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct State {
    pub(crate) id: Uuid,
    #[serde(serialize_with = "serialize_secret")]
    pub(crate) password: SecretString,
    pub(crate) file: String,
    #[serde(flatten)]
    pub(crate) distinguished_name: DistinguishedName,
}

impl State {
    fn to_model(&self) -> KeystoreModel {
        KeystoreModel {
            password: self.password.clone(),
            distinguished_name: self.distinguished_name.clone(),
            base64_text: self.file.clone(),
        }
    }

    /// The value of a schema attribute, if it is set.
    pub(crate) fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "password" => Some(self.password.expose_secret().clone()),
            "file" => Some(self.file.clone()),
            _ => subject_attribute(&self.distinguished_name, name).map(str::to_owned),
        }
    }
}

fn same_secret(a: &SecretString, b: &SecretString) -> bool {
    a.expose_secret()
        .as_bytes()
        .ct_eq(b.expose_secret().as_bytes())
        .into()
}

fn subject_attribute<'dn>(dn: &'dn DistinguishedName, name: &str) -> Option<&'dn str> {
    match name {
        "common_name" => dn.common_name.as_deref(),
        "organization" => dn.organization.as_deref(),
        "organizational_unit" => dn.organizational_unit.as_deref(),
        "locality" => dn.locality.as_deref(),
        "state" => dn.state.as_deref(),
        "country" => dn.country.as_deref(),
        _ => None,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Severity {
    Error,
    Warning,
}

/// A problem reported back to whoever drives the resource.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct Diagnostic {
    pub(crate) severity: Severity,
    pub(crate) summary: String,
    pub(crate) detail: String,
}

impl Diagnostic {
    pub(crate) fn error(operation: Operation, err: &Error) -> Self {
        Self {
            severity: Severity::Error,
            summary: format!("Error during {operation} operation"),
            detail: err.to_string(),
        }
    }

    fn warning(summary: &str, detail: String) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.to_owned(),
            detail,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

/// What applying a configuration does to the resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub(crate) enum Action {
    Create,
    NoOp,
    Update { rotate_password: bool },
    Replace { attributes: Vec<&'static str> },
}

impl Action {
    pub(crate) const fn operations(&self) -> &'static [Operation] {
        match self {
            Self::Create => &[Operation::Create],
            Self::NoOp => &[Operation::Read],
            Self::Update { .. } => &[Operation::Update],
            Self::Replace { .. } => &[Operation::Create, Operation::Delete],
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create a new keystore"),
            Self::NoOp => f.write_str("no changes"),
            Self::Update {
                rotate_password: true,
            } => f.write_str("update in place, re-encrypting the keystore with the new password"),
            Self::Update {
                rotate_password: false,
            } => f.write_str("update in place"),
            Self::Replace { attributes } => write!(
                f,
                "replace the keystore because {} changed",
                attributes.join(", ")
            ),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct Plan {
    #[serde(flatten)]
    pub(crate) action: Action,
    /// The lifecycle operations applying the plan runs, in order.
    pub(crate) operations: &'static [Operation],
    pub(crate) diagnostics: Vec<Diagnostic>,
}

/// Compares a configuration against the prior state of the resource.
pub(crate) fn plan(config: &Config, prior: Option<&State>) -> Plan {
    let Some(prior) = prior else {
        return Plan {
            action: Action::Create,
            operations: Action::Create.operations(),
            diagnostics: vec![],
        };
    };

    let mut replace = vec![];
    let mut diagnostics = vec![];
    for attribute in schema::ATTRIBUTES
        .iter()
        .filter(|a| a.plan_modifier == Some(PlanModifier::RequiresReplaceIfConfigured))
    {
        let configured = subject_attribute(&config.distinguished_name, attribute.name);
        let recorded = subject_attribute(&prior.distinguished_name, attribute.name);
        match (configured, recorded) {
            (Some(configured), recorded) if Some(configured) != recorded => {
                replace.push(attribute.name);
            }
            (None, Some(recorded)) => diagnostics.push(Diagnostic::warning(
                "Certificate subject unchanged",
                format!(
                    "{} is no longer configured, but the keystore certificate still carries \"{}\"; \
                     replace the resource to issue a new certificate",
                    attribute.name, recorded
                ),
            )),
            _ => {}
        }
    }

    let action = if !replace.is_empty() {
        Action::Replace {
            attributes: replace,
        }
    } else if !same_secret(&config.password, &prior.password) {
        Action::Update {
            rotate_password: true,
        }
    } else if config.distinguished_name != prior.distinguished_name {
        Action::Update {
            rotate_password: false,
        }
    } else {
        Action::NoOp
    };

    Plan {
        operations: action.operations(),
        action,
        diagnostics,
    }
}

pub(crate) async fn create(ctx: &Context, config: &Config) -> Result<State> {
    let model = KeystoreModel::new(config.password.clone(), config.distinguished_name.clone());
    let file = model.create_keystore_base64(ctx).await?;

    let state = State {
        id: rng::identifier(),
        password: config.password.clone(),
        file,
        distinguished_name: config.distinguished_name.clone(),
    };
    info!("Created keystore {}", state.id);
    Ok(state)
}

/// The keystore lives entirely in state, so reading it changes nothing.
pub(crate) fn read(prior: State) -> State {
    debug!("Read keystore {}", prior.id);
    prior
}

pub(crate) async fn update(ctx: &Context, config: &Config, prior: &State) -> Result<State> {
    let file = if same_secret(&config.password, &prior.password) {
        prior.file.clone()
    } else {
        prior
            .to_model()
            .update_keystore_base64(ctx, &config.password)
            .await?
    };

    info!("Updated keystore {}", prior.id);
    Ok(State {
        id: prior.id,
        password: config.password.clone(),
        file,
        distinguished_name: config.distinguished_name.clone(),
    })
}

pub(crate) fn delete(prior: State) {
    info!("Deleted keystore {}", prior.id);
}

/// Carries out a plan. On failure the prior state is what should remain
/// recorded, and the diagnostic names the operation that failed.
pub(crate) async fn apply(
    ctx: &Context,
    config: &Config,
    prior: Option<State>,
    action: &Action,
) -> Result<State, Diagnostic> {
    let failed = |operation| move |err: Error| Diagnostic::error(operation, &err);

    match (action, prior) {
        (Action::NoOp, Some(prior)) => Ok(read(prior)),
        (Action::Update { .. }, Some(prior)) => update(ctx, config, &prior)
            .await
            .map_err(failed(Operation::Update)),
        (Action::Replace { .. }, Some(prior)) => {
            let replaced = create(ctx, config)
                .await
                .map_err(failed(Operation::Create))?;
            delete(prior);
            Ok(replaced)
        }
        (Action::Create, _) | (_, None) => create(ctx, config)
            .await
            .map_err(failed(Operation::Create)),
    }
}
