// ─── Fabric Loader Install ───
// Downloads the official installer jar to a temp path, runs it as a child
// process, and cleans the jar up whether or not the run worked. The exit
// status is checked; a silent installer failure is a reported failure.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::downloader::Downloader;
use crate::core::error::{InstallerError, InstallerResult};

pub struct FabricInstaller {
    java_bin: PathBuf,
    installer_url: String,
}

impl FabricInstaller {
    pub fn new(java_bin: PathBuf, installer_url: String) -> Self {
        Self {
            java_bin,
            installer_url,
        }
    }

    /// Install the loader for one game/loader version pair.
    pub async fn install(
        &self,
        minecraft_version: &str,
        fabric_version: &str,
        downloader: &Downloader,
    ) -> InstallerResult<()> {
        let installer_path =
            std::env::temp_dir().join(format!("fabric-installer-{}.jar", Uuid::new_v4()));
        downloader
            .download_file(&self.installer_url, &installer_path, None)
            .await?;

        info!(
            "Installing Fabric {} for Minecraft {}",
            fabric_version, minecraft_version
        );
        let result = self
            .run_installer(&installer_path, minecraft_version, fabric_version)
            .await;

        // The jar is removed no matter how the invocation went.
        let _ = tokio::fs::remove_file(&installer_path).await;

        result?;
        info!("Fabric installed successfully");
        Ok(())
    }

    async fn run_installer(
        &self,
        installer_path: &Path,
        minecraft_version: &str,
        fabric_version: &str,
    ) -> InstallerResult<()> {
        let output = Command::new(&self.java_bin)
            .arg("-jar")
            .arg(installer_path)
            .args(Self::client_args(fabric_version, minecraft_version))
            .output()
            .await
            .map_err(|source| InstallerError::LoaderInstall {
                status: None,
                stderr: format!("failed to run {:?}: {source}", self.java_bin),
            })?;

        debug!(
            "Installer stdout: {}",
            String::from_utf8_lossy(&output.stdout).trim()
        );

        if !output.status.success() {
            return Err(InstallerError::LoaderInstall {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// `client -noprofile -loader <ver> -mcversion <ver>`; the profile is
    /// written by this tool, not the installer.
    fn client_args(fabric_version: &str, minecraft_version: &str) -> Vec<String> {
        vec![
            "client".to_string(),
            "-noprofile".to_string(),
            "-loader".to_string(),
            fabric_version.to_string(),
            "-mcversion".to_string(),
            minecraft_version.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::build_http_client;
    use crate::core::progress::ProgressReporter;
    use httpmock::prelude::*;

    #[test]
    fn client_args_carry_both_versions() {
        let args = FabricInstaller::client_args("0.15.11", "1.21");
        assert_eq!(
            args,
            vec!["client", "-noprofile", "-loader", "0.15.11", "-mcversion", "1.21"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_a_loader_install_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/installer.jar");
                then.status(200).body(b"not-a-real-jar");
            })
            .await;

        let downloader =
            Downloader::new(build_http_client().unwrap(), ProgressReporter::disabled());
        let installer =
            FabricInstaller::new(PathBuf::from("false"), server.url("/installer.jar"));

        let err = installer
            .install("1.21", "0.15.11", &downloader)
            .await
            .unwrap_err();
        assert!(matches!(err, InstallerError::LoaderInstall { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_succeeds_and_removes_the_jar() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/installer.jar");
                then.status(200).body(b"not-a-real-jar");
            })
            .await;

        let downloader =
            Downloader::new(build_http_client().unwrap(), ProgressReporter::disabled());
        let installer =
            FabricInstaller::new(PathBuf::from("true"), server.url("/installer.jar"));

        installer
            .install("1.21", "0.15.11", &downloader)
            .await
            .unwrap();
    }
}
