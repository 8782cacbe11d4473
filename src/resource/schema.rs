// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::metadata;

pub(crate) const DESCRIPTION: &str = "Keystore resource which creates a base64 encoded PKCS12 \
    keystore file valid for 25 years using the keytool utility. The machine running the provider \
    needs to have keytool installed. The file is persisted solely within the state as base64 text.";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PlanModifier {
    /// Keep the prior state value when no new one is known yet.
    UseStateForUnknown,
    /// Replace the resource when the configured value differs from state.
    RequiresReplaceIfConfigured,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Copy, Clone, Debug, Serialize)]
pub(crate) struct Attribute {
    pub(crate) name: &'static str,
    pub(crate) description: &'static str,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) required: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) optional: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) computed: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) plan_modifier: Option<PlanModifier>,
}

impl Attribute {
    const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            plan_modifier: None,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    const fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    const fn with_plan_modifier(mut self, modifier: PlanModifier) -> Self {
        self.plan_modifier = Some(modifier);
        self
    }

    const fn subject(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description)
            .optional()
            .with_plan_modifier(PlanModifier::RequiresReplaceIfConfigured)
    }
}

pub(crate) static ATTRIBUTES: [Attribute; 9] = [
    Attribute::new("id", "Generated UUID for the keystore")
        .computed()
        .with_plan_modifier(PlanModifier::UseStateForUnknown),
    Attribute::new(
        "password",
        "Password for the keystore and the single key in the keystore",
    )
    .required()
    .sensitive(),
    Attribute::new("file", "Base64 encoded keystore file")
        .computed()
        .sensitive(),
    Attribute::subject("common_name", "Common Name (CN)"),
    Attribute::subject("organization", "Organization (O)"),
    Attribute::subject("organizational_unit", "Organizational Unit (OU)"),
    Attribute::subject("locality", "Locality (L)"),
    Attribute::subject("state", "State (S)"),
    Attribute::subject("country", "Country (C)"),
];

pub(crate) fn attribute(name: &str) -> Option<&'static Attribute> {
    ATTRIBUTES.iter().find(|attribute| attribute.name == name)
}

#[derive(Debug, Serialize)]
pub(crate) struct Schema {
    provider: &'static str,
    version: &'static str,
    resource_type: &'static str,
    description: &'static str,
    attributes: &'static [Attribute],
}

pub(crate) fn schema() -> Schema {
    Schema {
        provider: metadata::PROVIDER_TYPE_NAME,
        version: &metadata::PROVIDER_VERSION,
        resource_type: &metadata::RESOURCE_TYPE_NAME,
        description: DESCRIPTION,
        attributes: &ATTRIBUTES,
    }
}
