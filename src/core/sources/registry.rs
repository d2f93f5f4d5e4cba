// ─── Registry Source ───
// Queries a Modrinth-compatible registry for the newest build of a mod
// matching the loader and an acceptable game version, then downloads it.

use std::path::Path;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core::downloader::Checksum;
use crate::core::error::{InstallerError, InstallerResult};

use super::context::AcquireContext;
use super::source::{AcquireOutcome, ModSource};

const LOADER_TAG: &str = "fabric";

/// Project metadata, as much of it as this workflow reads.
#[derive(Debug, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// One published build of a project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectVersion {
    pub id: String,
    pub version_number: String,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub files: Vec<VersionFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionFile {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub hashes: FileHashes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileHashes {
    pub sha1: Option<String>,
    pub sha512: Option<String>,
}

pub struct RegistrySource {
    base_url: String,
}

impl RegistrySource {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    /// `None` when the registry has no such project.
    async fn fetch_project(
        &self,
        client: &reqwest::Client,
        slug: &str,
    ) -> InstallerResult<Option<Project>> {
        let url = format!("{}/project/{}", self.base_url, slug);
        let response = client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(InstallerError::DownloadFailed {
                url,
                status: response.status().as_u16(),
            });
        }

        Ok(Some(response.json::<Project>().await?))
    }

    async fn fetch_versions(
        &self,
        client: &reqwest::Client,
        slug: &str,
        game_versions: &[String],
    ) -> InstallerResult<Vec<ProjectVersion>> {
        let url = format!("{}/project/{}/version", self.base_url, slug);
        // The registry expects JSON-array-encoded query values.
        let game_versions_param = serde_json::to_string(game_versions)?;
        let loaders_param = serde_json::to_string(&[LOADER_TAG])?;

        let response = client
            .get(&url)
            .query(&[
                ("game_versions", game_versions_param.as_str()),
                ("loaders", loaders_param.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InstallerError::DownloadFailed {
                url,
                status: response.status().as_u16(),
            });
        }

        Ok(response.json::<Vec<ProjectVersion>>().await?)
    }

    /// The file flagged primary, or the first one when nothing is flagged.
    fn select_file(version: &ProjectVersion) -> Option<&VersionFile> {
        version
            .files
            .iter()
            .find(|file| file.primary)
            .or_else(|| version.files.first())
    }

    fn checksum_for(file: &VersionFile) -> Option<Checksum> {
        file.hashes
            .sha1
            .clone()
            .map(Checksum::Sha1)
            .or_else(|| file.hashes.sha512.clone().map(Checksum::Sha512))
    }
}

#[async_trait]
impl ModSource for RegistrySource {
    async fn acquire(&self, ctx: AcquireContext<'_>) -> InstallerResult<AcquireOutcome> {
        let Some(project) = self.fetch_project(ctx.http_client, ctx.slug).await? else {
            warn!("Registry has no project named {}", ctx.slug);
            return Ok(AcquireOutcome::Unavailable);
        };
        debug!(
            "Resolving {} ({})",
            ctx.slug,
            project.title.as_deref().unwrap_or(&project.id)
        );

        // Exact version first; widen to the compatible set only if needed.
        let exact = [ctx.minecraft_version.to_string()];
        let mut versions = self
            .fetch_versions(ctx.http_client, ctx.slug, &exact)
            .await?;
        if versions.is_empty() && ctx.game_versions.len() > 1 {
            debug!(
                "No {} build of {} for {}, widening to {:?}",
                LOADER_TAG, ctx.slug, ctx.minecraft_version, ctx.game_versions
            );
            versions = self
                .fetch_versions(ctx.http_client, ctx.slug, ctx.game_versions)
                .await?;
        }

        // First entry is the newest by the registry's own ordering.
        let Some(latest) = versions.first() else {
            warn!(
                "No compatible build of {} for any of {:?}",
                ctx.slug, ctx.game_versions
            );
            return Ok(AcquireOutcome::Unavailable);
        };
        let Some(file) = Self::select_file(latest) else {
            warn!("Build {} of {} has no files", latest.id, ctx.slug);
            return Ok(AcquireOutcome::Unavailable);
        };

        // Only the final path component; the registry does not get to pick
        // where on disk a file lands.
        let file_name = Path::new(&file.filename)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.jar", ctx.slug));
        let dest = ctx.mods_dir.join(file_name);

        let checksum = Self::checksum_for(file);
        ctx.downloader
            .download_file(&file.url, &dest, checksum.as_ref())
            .await?;

        info!(
            "Downloaded {} {} -> {:?}",
            ctx.slug, latest.version_number, dest
        );
        Ok(AcquireOutcome::Downloaded(dest))
    }
}
