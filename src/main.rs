// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod command;
mod error;
mod keytool;
mod metadata;
mod model;
mod resource;
mod rng;
mod storage;

use std::{path::PathBuf, process};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use command::Workspace;
use error::Result;
use keytool::Keytool;
use log::{debug, error};

#[derive(Debug, Subcommand)]
enum Command {
    Plan(command::plan::Command),
    Apply(command::apply::Command),
    Show(command::show::Command),
    Destroy(command::destroy::Command),
    Schema(command::schema::Command),
}

#[async_trait]
impl command::Command for Command {
    async fn execute(self, workspace: &mut Workspace) -> Result<()> {
        match self {
            Self::Plan(cmd) => cmd.execute(workspace).await,
            Self::Apply(cmd) => cmd.execute(workspace).await,
            Self::Show(cmd) => cmd.execute(workspace).await,
            Self::Destroy(cmd) => cmd.execute(workspace).await,
            Self::Schema(cmd) => cmd.execute(workspace).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The JSON file declaring the keystore: a required `password` and
    /// optional `common_name`, `organization`, `organizational_unit`,
    /// `locality`, `state` and `country`.
    #[arg(long, env = "JKS_CONFIG", default_value = "keystore.json", value_hint = clap::ValueHint::FilePath)]
    config: PathBuf,

    /// The JSON file the keystore state is recorded in.
    #[arg(long, env = "JKS_STATE", default_value = "terraform.tfstate.json", value_hint = clap::ValueHint::FilePath)]
    state: PathBuf,

    /// The path to the keytool program. Looked up on the PATH by default.
    #[arg(long, env = "JKS_KEYTOOL", value_hint = clap::ValueHint::ExecutablePath)]
    keytool: Option<PathBuf>,

    /// The directory to create short-lived keystore files in. Defaults to
    /// the system temporary directory.
    #[arg(long, env = "JKS_SCRATCH_DIR", value_hint = clap::ValueHint::DirPath)]
    scratch_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

async fn run(args: Args) -> Result<()> {
    debug!(
        "{} {} managing {}",
        *metadata::PROVIDER_DISPLAY_NAME,
        *metadata::PROVIDER_VERSION,
        *metadata::RESOURCE_TYPE_NAME
    );

    let keytool = args
        .keytool
        .map_or_else(Keytool::new, Keytool::new_with_executable);
    let mut context = model::Context::new(keytool);
    if let Some(scratch_dir) = args.scratch_dir {
        context = context.with_scratch_root(scratch_dir);
    }

    let mut workspace = Workspace::new(
        context,
        args.config,
        Box::new(storage::File::new(args.state)),
    );

    command::Command::execute(args.command, &mut workspace).await
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("JKS_LOG", "warn")
        .write_style("JKS_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn arguments() {
        Args::command().debug_assert();
    }
}
