// ─── Install Workflow ───
// Sequences the whole run: loader install -> per-mod acquisition ->
// rollback on any unavailable mod -> profile write. One network call at a
// time; cancellation is checked between steps.
//
// Failure policy (fixed contract): every per-mod error is downgraded to
// "unavailable" and the batch always runs to completion. A non-empty
// unavailable list rolls back every file this run downloaded and surfaces
// as `InstallerError::ModsUnavailable`.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::compat::CompatTable;
use crate::core::config::InstallerConfig;
use crate::core::downloader::Downloader;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::build_http_client;
use crate::core::loader::FabricInstaller;
use crate::core::paths;
use crate::core::profile::{LauncherProfile, ProfileWriter};
use crate::core::progress::{CancelToken, ProgressEvent, ProgressReporter};
use crate::core::sources::{AcquireContext, AcquireOutcome, Source};

/// What a successful run produced.
#[derive(Debug)]
pub struct InstallReport {
    pub mod_paths: Vec<PathBuf>,
    pub profile_path: PathBuf,
}

pub struct InstallWorkflow {
    config: InstallerConfig,
    http_client: reqwest::Client,
    downloader: Downloader,
    progress: ProgressReporter,
    cancel: CancelToken,
}

impl InstallWorkflow {
    pub fn new(
        config: InstallerConfig,
        progress: ProgressReporter,
        cancel: CancelToken,
    ) -> InstallerResult<Self> {
        let http_client = build_http_client()?;
        let downloader = Downloader::new(http_client.clone(), progress.clone());
        Ok(Self {
            config,
            http_client,
            downloader,
            progress,
            cancel,
        })
    }

    pub async fn run(&self) -> InstallerResult<InstallReport> {
        let minecraft_dir = self.config.resolved_minecraft_dir()?;
        let mods_dir = paths::mods_dir(&minecraft_dir);
        let game_versions = CompatTable::new(self.config.compatible_versions.clone())
            .resolve(&self.config.minecraft_version);

        info!(
            "Installing {} mod(s) for Minecraft {} (acceptable versions: {:?})",
            self.config.mods.len(),
            self.config.minecraft_version,
            game_versions
        );

        if self.cancel.is_cancelled() {
            return Err(InstallerError::Cancelled);
        }

        // Loader first, unconditional; a failed install aborts the run
        // before anything lands in mods/.
        self.progress.emit(ProgressEvent::LoaderInstallStarted);
        FabricInstaller::new(
            self.config.java_bin.clone(),
            self.config.installer_url.clone(),
        )
        .install(
            &self.config.minecraft_version,
            &self.config.fabric_version,
            &self.downloader,
        )
        .await?;
        self.progress.emit(ProgressEvent::LoaderInstalled);

        let mut downloaded: Vec<PathBuf> = Vec::new();
        let mut unavailable: Vec<String> = Vec::new();
        let total = self.config.mods.len();

        for (index, slug) in self.config.mods.iter().enumerate() {
            if self.cancel.is_cancelled() {
                self.rollback(&downloaded, &mods_dir, &minecraft_dir).await;
                return Err(InstallerError::Cancelled);
            }

            self.progress.emit(ProgressEvent::ModStarted {
                slug: slug.clone(),
                index,
                total,
            });
            info!("Acquiring mod: {}", slug);

            let ctx = AcquireContext {
                slug,
                minecraft_version: &self.config.minecraft_version,
                game_versions: &game_versions,
                mods_dir: &mods_dir,
                downloader: &self.downloader,
                http_client: &self.http_client,
            };
            let fraction = (index + 1) as f32 / total.max(1) as f32;

            match Source::for_slug(slug, &self.config).acquire(ctx).await {
                Ok(AcquireOutcome::Downloaded(path)) => {
                    downloaded.push(path);
                    self.progress.emit(ProgressEvent::ModDownloaded {
                        slug: slug.clone(),
                        fraction,
                    });
                }
                Ok(AcquireOutcome::Unavailable) => {
                    warn!(
                        "{} has no build for Minecraft {}",
                        slug, self.config.minecraft_version
                    );
                    unavailable.push(slug.clone());
                    self.progress.emit(ProgressEvent::ModUnavailable {
                        slug: slug.clone(),
                        fraction,
                    });
                }
                // Transport and filesystem errors count against this mod
                // only; the batch keeps going.
                Err(err) => {
                    warn!("Error acquiring {}: {}", slug, err);
                    unavailable.push(slug.clone());
                    self.progress.emit(ProgressEvent::ModUnavailable {
                        slug: slug.clone(),
                        fraction,
                    });
                }
            }
        }

        if !unavailable.is_empty() {
            self.progress.emit(ProgressEvent::RollbackStarted);
            self.rollback(&downloaded, &mods_dir, &minecraft_dir).await;
            return Err(InstallerError::ModsUnavailable { mods: unavailable });
        }

        let writer = ProfileWriter::new(&minecraft_dir);
        writer
            .write(&LauncherProfile::fabric(
                &minecraft_dir,
                &self.config.minecraft_version,
                &self.config.fabric_version,
            ))
            .await?;
        self.progress.emit(ProgressEvent::ProfileWritten);

        Ok(InstallReport {
            mod_paths: downloaded,
            profile_path: writer.path().to_path_buf(),
        })
    }

    /// Undo this run's downloads: every acquired file, the mods directory
    /// when that leaves it empty, and the loader's version directory.
    async fn rollback(&self, downloaded: &[PathBuf], mods_dir: &Path, minecraft_dir: &Path) {
        for path in downloaded {
            match tokio::fs::remove_file(path).await {
                Ok(()) => info!("Removed {:?}", path),
                Err(err) => warn!("Could not remove {:?}: {}", path, err),
            }
        }

        if let Ok(mut entries) = tokio::fs::read_dir(mods_dir).await {
            if matches!(entries.next_entry().await, Ok(None)) {
                match tokio::fs::remove_dir(mods_dir).await {
                    Ok(()) => info!("Removed empty directory {:?}", mods_dir),
                    Err(err) => warn!("Could not remove {:?}: {}", mods_dir, err),
                }
            }
        }

        let version_dir = paths::loader_version_dir(
            minecraft_dir,
            &self.config.fabric_version,
            &self.config.minecraft_version,
        );
        if tokio::fs::metadata(&version_dir).await.is_ok() {
            match tokio::fs::remove_dir_all(&version_dir).await {
                Ok(()) => info!("Removed loader version {:?}", version_dir),
                Err(err) => warn!("Could not remove {:?}: {}", version_dir, err),
            }
        }
    }
}
