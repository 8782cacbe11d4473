// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use inflector::Inflector;
use once_cell::sync::Lazy;

pub(crate) const PROVIDER_TYPE_NAME: &str = "jks";
pub(crate) static PROVIDER_VERSION: Lazy<String> =
    Lazy::new(|| option_env!("CARGO_PKG_VERSION").unwrap_or("dev").to_owned());
pub(crate) static PROVIDER_DISPLAY_NAME: Lazy<String> = Lazy::new(|| {
    option_env!("CARGO_PKG_NAME")
        .unwrap_or("terraform-provider-jks")
        .to_title_case()
});

pub(crate) static RESOURCE_TYPE_NAME: Lazy<String> =
    Lazy::new(|| format!("{PROVIDER_TYPE_NAME}_keystore"));
