// ─── CI Artifact Source ───
// One mod ships nightly jars as CI build artifacts instead of registry
// releases. This source walks the provider's API: latest successful run of
// a fixed workflow -> its artifact list -> the named artifact archive ->
// the first qualifying jar inside it.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core::config::CiConfig;
use crate::core::error::{InstallerError, InstallerResult};

use super::context::AcquireContext;
use super::source::{AcquireOutcome, ModSource};

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const ACCEPT_JSON: &str = "application/vnd.github+json";

const JAR_SUFFIX: &str = ".jar";
/// API-only bundles that must never land in the mods directory.
const EXCLUDED_SUFFIXES: [&str; 2] = ["-api.jar", "-sources.jar"];

#[derive(Debug, Deserialize)]
struct WorkflowRuns {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub head_sha: String,
    pub artifacts_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ArtifactList {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub id: u64,
    pub name: String,
    pub archive_download_url: String,
    #[serde(default)]
    pub expired: bool,
}

pub struct CiArtifactSource {
    config: CiConfig,
}

impl CiArtifactSource {
    pub fn new(config: CiConfig) -> Self {
        Self { config }
    }

    fn request(&self, client: &reqwest::Client, url: &str) -> reqwest::RequestBuilder {
        let mut request = client
            .get(url)
            .header(ACCEPT, ACCEPT_JSON)
            .header(API_VERSION_HEADER, API_VERSION);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Most recent successful run of the configured workflow, if any.
    async fn latest_run(&self, client: &reqwest::Client) -> InstallerResult<Option<WorkflowRun>> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/runs",
            self.config.api_url, self.config.owner, self.config.repo, self.config.workflow
        );
        let response = self
            .request(client, &url)
            .query(&[("status", "success"), ("per_page", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InstallerError::DownloadFailed {
                url,
                status: response.status().as_u16(),
            });
        }

        let runs = response.json::<WorkflowRuns>().await?;
        Ok(runs.workflow_runs.into_iter().next())
    }

    async fn fetch_artifacts(
        &self,
        client: &reqwest::Client,
        run: &WorkflowRun,
    ) -> InstallerResult<Vec<Artifact>> {
        let response = self.request(client, &run.artifacts_url).send().await?;
        if !response.status().is_success() {
            return Err(InstallerError::DownloadFailed {
                url: run.artifacts_url.clone(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.json::<ArtifactList>().await?.artifacts)
    }

    async fn download_archive(
        &self,
        client: &reqwest::Client,
        artifact: &Artifact,
    ) -> InstallerResult<Vec<u8>> {
        let response = self
            .request(client, &artifact.archive_download_url)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(InstallerError::DownloadFailed {
                url: artifact.archive_download_url.clone(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// A distributable game jar; api-only and sources bundles are skipped.
    fn qualifies(name: &str) -> bool {
        name.ends_with(JAR_SUFFIX)
            && !EXCLUDED_SUFFIXES
                .iter()
                .any(|suffix| name.ends_with(suffix))
    }

    /// First qualifying jar in the archive, extracted entirely in memory.
    fn extract_jar(archive_bytes: &[u8]) -> InstallerResult<Option<(String, Vec<u8>)>> {
        let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes))?;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if !entry.is_file() {
                continue;
            }
            let Some(name) = entry
                .enclosed_name()
                .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            else {
                continue;
            };
            if !Self::qualifies(&name) {
                continue;
            }

            let mut data = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut data)
                .map_err(|source| InstallerError::Io {
                    path: std::path::PathBuf::from(&name),
                    source,
                })?;
            return Ok(Some((name, data)));
        }
        Ok(None)
    }

    fn short_sha(head_sha: &str) -> &str {
        head_sha.get(..7).unwrap_or(head_sha)
    }
}

#[async_trait]
impl ModSource for CiArtifactSource {
    async fn acquire(&self, ctx: AcquireContext<'_>) -> InstallerResult<AcquireOutcome> {
        let Some(run) = self.latest_run(ctx.http_client).await? else {
            warn!(
                "No successful {} runs in {}/{}",
                self.config.workflow, self.config.owner, self.config.repo
            );
            return Ok(AcquireOutcome::Unavailable);
        };
        debug!(
            "Latest successful run {} ({}), created {:?}",
            run.id,
            Self::short_sha(&run.head_sha),
            run.created_at
        );

        let artifacts = self.fetch_artifacts(ctx.http_client, &run).await?;
        let Some(artifact) = artifacts
            .into_iter()
            .find(|artifact| artifact.name == self.config.artifact_name && !artifact.expired)
        else {
            warn!(
                "Run {} has no live artifact named {:?}",
                run.id, self.config.artifact_name
            );
            return Ok(AcquireOutcome::Unavailable);
        };

        let archive = self.download_archive(ctx.http_client, &artifact).await?;
        let Some((entry_name, data)) = Self::extract_jar(&archive)? else {
            warn!(
                "Artifact {} of run {} contains no distributable jar",
                artifact.id, run.id
            );
            return Ok(AcquireOutcome::Unavailable);
        };

        let file_name = format!(
            "{}-{}+{}.jar",
            ctx.slug,
            ctx.minecraft_version,
            Self::short_sha(&run.head_sha)
        );
        let dest = ctx.mods_dir.join(&file_name);
        tokio::fs::create_dir_all(ctx.mods_dir)
            .await
            .map_err(|source| InstallerError::Io {
                path: ctx.mods_dir.to_path_buf(),
                source,
            })?;
        tokio::fs::write(&dest, &data)
            .await
            .map_err(|source| InstallerError::Io {
                path: dest.clone(),
                source,
            })?;

        info!(
            "Downloaded {} from CI ({} -> {:?})",
            ctx.slug, entry_name, dest
        );
        Ok(AcquireOutcome::Downloaded(dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::Downloader;
    use crate::core::http::build_http_client;
    use crate::core::progress::ProgressReporter;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::io::Write;

    fn ci_config(server: &MockServer) -> CiConfig {
        CiConfig {
            api_url: server.base_url(),
            owner: "Tuinity".to_string(),
            repo: "Moonrise".to_string(),
            workflow: "build.yml".to_string(),
            artifact_name: "build-artifacts".to_string(),
            mod_slug: "moonrise".to_string(),
            token: Some("test-token".to_string()),
        }
    }

    fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buffer));
            let options = zip::write::SimpleFileOptions::default();
            for (name, data) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer
    }

    async fn acquire_with(server: &MockServer) -> InstallerResult<AcquireOutcome> {
        let client = build_http_client().unwrap();
        let downloader = Downloader::new(client.clone(), ProgressReporter::disabled());
        let dir = tempfile::tempdir().unwrap();
        let mods_dir = dir.path().join("mods");
        let versions = vec!["1.21".to_string()];

        let outcome = CiArtifactSource::new(ci_config(server))
            .acquire(AcquireContext {
                slug: "moonrise",
                minecraft_version: "1.21",
                game_versions: &versions,
                mods_dir: &mods_dir,
                downloader: &downloader,
                http_client: &client,
            })
            .await;

        // Keep the tempdir alive until the outcome has been inspected.
        if let Ok(AcquireOutcome::Downloaded(path)) = &outcome {
            assert!(path.exists());
            let data = std::fs::read(path).unwrap();
            assert_eq!(data, b"game-jar");
            assert_eq!(
                path.file_name().unwrap().to_string_lossy(),
                "moonrise-1.21+abc1234.jar"
            );
        }
        outcome
    }

    async fn mock_runs(server: &MockServer, runs: serde_json::Value) {
        server
            .mock_async(move |when, then| {
                when.method(GET)
                    .path("/repos/Tuinity/Moonrise/actions/workflows/build.yml/runs")
                    .query_param("status", "success")
                    .header("X-GitHub-Api-Version", API_VERSION)
                    .header("authorization", "Bearer test-token");
                then.status(200).json_body(runs);
            })
            .await;
    }

    #[tokio::test]
    async fn picks_the_distributable_jar_and_names_it_by_commit() {
        let server = MockServer::start_async().await;
        mock_runs(
            &server,
            json!({"workflow_runs": [{
                "id": 42,
                "head_sha": "abc1234def5678",
                "artifacts_url": server.url("/artifacts/42"),
                "created_at": "2024-07-01T12:00:00Z"
            }]}),
        )
        .await;
        let artifacts = json!({"artifacts": [{
            "id": 7,
            "name": "build-artifacts",
            "archive_download_url": server.url("/download/7"),
            "expired": false
        }]});
        server
            .mock_async(move |when, then| {
                when.method(GET).path("/artifacts/42");
                then.status(200).json_body(artifacts);
            })
            .await;
        let archive = zip_archive(&[
            ("moonrise-fabric-1.21-api.jar", b"api-only"),
            ("moonrise-fabric-1.21-sources.jar", b"sources"),
            ("moonrise-fabric-1.21.jar", b"game-jar"),
        ]);
        server
            .mock_async(move |when, then| {
                when.method(GET).path("/download/7");
                then.status(200).body(archive);
            })
            .await;

        let outcome = acquire_with(&server).await.unwrap();
        assert!(matches!(outcome, AcquireOutcome::Downloaded(_)));
    }

    #[tokio::test]
    async fn zero_artifacts_is_unavailable_not_an_error() {
        let server = MockServer::start_async().await;
        mock_runs(
            &server,
            json!({"workflow_runs": [{
                "id": 43,
                "head_sha": "abc1234def5678",
                "artifacts_url": server.url("/artifacts/43")
            }]}),
        )
        .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/artifacts/43");
                then.status(200).json_body(json!({"artifacts": []}));
            })
            .await;

        let outcome = acquire_with(&server).await.unwrap();
        assert_eq!(outcome, AcquireOutcome::Unavailable);
    }

    #[tokio::test]
    async fn no_successful_runs_is_unavailable() {
        let server = MockServer::start_async().await;
        mock_runs(&server, json!({"workflow_runs": []})).await;

        let outcome = acquire_with(&server).await.unwrap();
        assert_eq!(outcome, AcquireOutcome::Unavailable);
    }

    #[test]
    fn jar_selection_skips_api_only_bundles() {
        assert!(CiArtifactSource::qualifies("moonrise-fabric-1.21.jar"));
        assert!(!CiArtifactSource::qualifies("moonrise-fabric-1.21-api.jar"));
        assert!(!CiArtifactSource::qualifies(
            "moonrise-fabric-1.21-sources.jar"
        ));
        assert!(!CiArtifactSource::qualifies("README.md"));
    }

    #[test]
    fn short_sha_is_bounded() {
        assert_eq!(CiArtifactSource::short_sha("abc1234def"), "abc1234");
        assert_eq!(CiArtifactSource::short_sha("ab"), "ab");
    }
}
