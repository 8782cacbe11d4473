// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::{Output, Stdio},
};

use log::debug;
use secrecy::{ExposeSecret as _, SecretString};
use tokio::process::Command;

use crate::{
    error::{self, Result},
    model::DistinguishedName,
};

pub(crate) const ALIAS: &str = "keystore";
pub(crate) const VALIDITY_DAYS: u32 = 10_000;
pub(crate) const KEY_ALGORITHM: &str = "RSA";
pub(crate) const KEY_SIZE: u32 = 2048;
pub(crate) const STORE_TYPE: &str = "PKCS12";

/// Runs the `keytool` utility shipped with Java installations.
#[derive(Debug, Clone)]
pub(crate) struct Keytool {
    program: OsString,
    leading_args: Vec<OsString>,
}

impl Keytool {
    pub(crate) fn new() -> Self {
        Self::new_with_executable("keytool")
    }

    pub(crate) fn new_with_executable<P: AsRef<Path>>(executable: P) -> Self {
        Self {
            program: executable.as_ref().as_os_str().into(),
            leading_args: vec![],
        }
    }

    /// Runs a script through an interpreter instead of executing a binary
    /// directly.
    #[cfg(test)]
    pub(crate) fn new_with_interpreter<I: AsRef<Path>, S: AsRef<Path>>(
        interpreter: I,
        script: S,
    ) -> Self {
        Self {
            program: interpreter.as_ref().as_os_str().into(),
            leading_args: vec![script.as_ref().as_os_str().into()],
        }
    }

    /// Generates a new keystore containing a single RSA keypair with a
    /// self-signed certificate for the given subject.
    pub(crate) async fn generate_keypair(
        &self,
        keystore: &Path,
        password: &SecretString,
        subject: &DistinguishedName,
    ) -> Result<()> {
        self.run(
            "genkeypair",
            genkeypair_args(keystore, password, &subject.to_string()),
        )
        .await
    }

    /// Copies every entry of one PKCS12 keystore into a new one protected by
    /// a different password.
    pub(crate) async fn import_keystore(
        &self,
        source: &Path,
        source_password: &SecretString,
        destination: &Path,
        destination_password: &SecretString,
    ) -> Result<()> {
        self.run(
            "importkeystore",
            importkeystore_args(source, source_password, destination, destination_password),
        )
        .await
    }

    async fn run(&self, operation: &'static str, args: Vec<OsString>) -> Result<()> {
        debug!(
            "Running {} -{}",
            self.program.to_string_lossy(),
            operation
        );

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| error::Keytool::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        if output.status.success() {
            debug!("{} -{} finished", self.program.to_string_lossy(), operation);
            Ok(())
        } else {
            Err(error::Keytool::Status {
                operation,
                status: output.status,
                output: combined_output(&output),
            }
            .into())
        }
    }
}

impl Default for Keytool {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins the non-empty standard output and standard error streams, one after
/// the other on separate lines.
fn combined_output(output: &Output) -> String {
    [&output.stdout, &output.stderr]
        .into_iter()
        .map(|stream| String::from_utf8_lossy(stream).trim_end().to_owned())
        .filter(|stream| !stream.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn arg<S: AsRef<OsStr>>(value: S) -> OsString {
    value.as_ref().to_owned()
}

fn genkeypair_args(keystore: &Path, password: &SecretString, dname: &str) -> Vec<OsString> {
    vec![
        arg("-v"),
        arg("-genkeypair"),
        arg("-alias"),
        arg(ALIAS),
        arg("-keypass"),
        arg(password.expose_secret()),
        arg("-keystore"),
        arg(keystore),
        arg("-storepass"),
        arg(password.expose_secret()),
        arg("-validity"),
        arg(VALIDITY_DAYS.to_string()),
        arg("-keyalg"),
        arg(KEY_ALGORITHM),
        arg("-keysize"),
        arg(KEY_SIZE.to_string()),
        arg("-dname"),
        arg(dname),
    ]
}

fn importkeystore_args(
    source: &Path,
    source_password: &SecretString,
    destination: &Path,
    destination_password: &SecretString,
) -> Vec<OsString> {
    vec![
        arg("-importkeystore"),
        arg("-srckeystore"),
        arg(source),
        arg("-srcstoretype"),
        arg(STORE_TYPE),
        arg("-srcstorepass"),
        arg(source_password.expose_secret()),
        arg("-destkeystore"),
        arg(destination),
        arg("-deststoretype"),
        arg(STORE_TYPE),
        arg("-deststorepass"),
        arg(destination_password.expose_secret()),
        arg("-destkeypass"),
        arg(destination_password.expose_secret()),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        fs,
        path::{Path, PathBuf},
    };

    use tempfile::TempDir;

    use super::Keytool;

    const WORKING: &str = r#"set -eu
log="$(dirname "$0")/invocations"
mode=""
src=""
dest=""
pass=""
srcpass=""
dname=""
while [ "$#" -gt 0 ]; do
  case "$1" in
    -genkeypair) mode=genkeypair ;;
    -importkeystore) mode=importkeystore ;;
    -keystore|-destkeystore) dest="$2"; shift ;;
    -srckeystore) src="$2"; shift ;;
    -storepass|-deststorepass) pass="$2"; shift ;;
    -srcstorepass) srcpass="$2"; shift ;;
    -dname) dname="$2"; shift ;;
    -alias|-keypass|-validity|-keyalg|-keysize|-srcstoretype|-deststoretype|-destkeypass) shift ;;
  esac
  shift
done
printf '%s %s %s\n' "$mode" "$src" "$dest" >> "$log"
case "$mode" in
  genkeypair)
    { printf '%s\n' "$pass"; printf '%s\n' "$dname"; head -c 1536 /dev/urandom; } > "$dest"
    ;;
  importkeystore)
    if [ "$(head -n 1 "$src")" != "$srcpass" ]; then
      echo "keytool error: java.io.IOException: keystore password was incorrect"
      exit 1
    fi
    { printf '%s\n' "$pass"; tail -n +2 "$src"; } > "$dest"
    ;;
  *)
    echo "Illegal option"
    exit 1
    ;;
esac
"#;

    const FAILING: &str = r#"printf 'failed\n' >> "$(dirname "$0")/invocations"
echo "keytool error: java.lang.Exception: something went wrong" >&2
exit 1
"#;

    const SILENT: &str = r#"printf 'silent\n' >> "$(dirname "$0")/invocations"
exit 0
"#;

    /// A shell script standing in for `keytool`. Generated keystores record
    /// their password on the first line, followed by the subject and random
    /// padding, so password checks and rotation can be observed.
    pub(crate) struct FakeKeytool {
        dir: TempDir,
    }

    impl FakeKeytool {
        fn with_script(script: &str) -> Self {
            let dir = TempDir::new().expect("temporary directory");
            fs::write(dir.path().join("keytool.sh"), script).expect("fake keytool script");
            Self { dir }
        }

        pub(crate) fn working() -> Self {
            Self::with_script(WORKING)
        }

        pub(crate) fn failing() -> Self {
            Self::with_script(FAILING)
        }

        /// Succeeds without producing any output file.
        pub(crate) fn silent() -> Self {
            Self::with_script(SILENT)
        }

        pub(crate) fn keytool(&self) -> Keytool {
            Keytool::new_with_interpreter("/bin/sh", self.dir.path().join("keytool.sh"))
        }

        pub(crate) fn path(&self) -> &Path {
            self.dir.path()
        }

        /// Each invocation as its mode followed by the keystore paths it was
        /// given.
        pub(crate) fn invocations(&self) -> Vec<Vec<String>> {
            fs::read_to_string(self.dir.path().join("invocations"))
                .map(|log| {
                    log.lines()
                        .map(|line| line.split_whitespace().map(str::to_owned).collect())
                        .collect()
                })
                .unwrap_or_default()
        }

        pub(crate) fn touched_paths(&self) -> Vec<PathBuf> {
            self.invocations()
                .into_iter()
                .flat_map(|invocation| invocation.into_iter().skip(1).map(PathBuf::from))
                .collect()
        }
    }
}
