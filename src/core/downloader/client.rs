use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use sha2::Sha512;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::progress::{DownloadProgress, ProgressEvent, ProgressReporter};

/// Expected digest of a downloaded file. The registry publishes both; sha1
/// is preferred, sha512 covers files without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checksum {
    Sha1(String),
    Sha512(String),
}

/// Streaming, checksum-validated downloader.
pub struct Downloader {
    client: Client,
    progress: ProgressReporter,
}

impl Downloader {
    pub fn new(client: Client, progress: ProgressReporter) -> Self {
        Self { client, progress }
    }

    /// Download a single file to `dest`, optionally validating its digest.
    ///
    /// Creates parent directories as needed. Chunks stream straight to disk
    /// and byte-level progress is emitted along the way; a file that fails
    /// validation is removed before the error is returned.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        checksum: Option<&Checksum>,
    ) -> InstallerResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| InstallerError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallerError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total_bytes = response.content_length();
        let file_name = dest
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut sha1 = matches!(checksum, Some(Checksum::Sha1(_))).then(Sha1::new);
        let mut sha512 = matches!(checksum, Some(Checksum::Sha512(_))).then(Sha512::new);

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|source| InstallerError::Io {
                path: dest.to_path_buf(),
                source,
            })?;

        let mut bytes_downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if let Some(hasher) = &mut sha1 {
                hasher.update(&chunk);
            }
            if let Some(hasher) = &mut sha512 {
                hasher.update(&chunk);
            }
            file.write_all(&chunk)
                .await
                .map_err(|source| InstallerError::Io {
                    path: dest.to_path_buf(),
                    source,
                })?;

            bytes_downloaded += chunk.len() as u64;
            self.progress.emit(ProgressEvent::Download(DownloadProgress {
                url: url.to_string(),
                bytes_downloaded,
                total_bytes,
                file_name: file_name.clone(),
            }));
        }

        file.flush().await.map_err(|source| InstallerError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        // Handle must be closed before a failed validation can unlink the
        // file on Windows.
        drop(file);

        match checksum {
            Some(Checksum::Sha1(expected)) => {
                if let Some(hasher) = sha1 {
                    let actual = hex::encode(hasher.finalize());
                    if !actual.eq_ignore_ascii_case(expected) {
                        let _ = tokio::fs::remove_file(dest).await;
                        return Err(InstallerError::ChecksumMismatch {
                            algorithm: "SHA-1",
                            path: dest.to_path_buf(),
                            expected: expected.clone(),
                            actual,
                        });
                    }
                }
            }
            Some(Checksum::Sha512(expected)) => {
                if let Some(hasher) = sha512 {
                    let actual = hex::encode(hasher.finalize());
                    if !actual.eq_ignore_ascii_case(expected) {
                        let _ = tokio::fs::remove_file(dest).await;
                        return Err(InstallerError::ChecksumMismatch {
                            algorithm: "SHA-512",
                            path: dest.to_path_buf(),
                            expected: expected.clone(),
                            actual,
                        });
                    }
                }
            }
            None => {}
        }

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use crate::core::http::build_http_client;

    fn downloader() -> Downloader {
        Downloader::new(build_http_client().unwrap(), ProgressReporter::disabled())
    }

    #[tokio::test]
    async fn downloads_and_validates_sha1() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/mod.jar");
                then.status(200).body(b"jar-bytes");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mods").join("mod.jar");

        // sha1("jar-bytes")
        let expected = {
            let mut hasher = Sha1::new();
            hasher.update(b"jar-bytes");
            hex::encode(hasher.finalize())
        };

        downloader()
            .download_file(
                &server.url("/mod.jar"),
                &dest,
                Some(&Checksum::Sha1(expected)),
            )
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"jar-bytes");
    }

    #[tokio::test]
    async fn checksum_mismatch_removes_the_file() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/mod.jar");
                then.status(200).body(b"tampered");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mod.jar");

        let err = downloader()
            .download_file(
                &server.url("/mod.jar"),
                &dest,
                Some(&Checksum::Sha1("0".repeat(40))),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, InstallerError::ChecksumMismatch { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/gone.jar");
                then.status(404);
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = downloader()
            .download_file(&server.url("/gone.jar"), &dir.path().join("gone.jar"), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InstallerError::DownloadFailed { status: 404, .. }
        ));
    }
}
