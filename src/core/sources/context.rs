use std::path::Path;

use crate::core::downloader::Downloader;

/// Everything a source needs to acquire one mod.
pub struct AcquireContext<'a> {
    /// Registry slug of the mod being acquired.
    pub slug: &'a str,
    /// The version the user asked for.
    pub minecraft_version: &'a str,
    /// Full acceptable set, requested version first.
    pub game_versions: &'a [String],
    pub mods_dir: &'a Path,
    pub downloader: &'a Downloader,
    pub http_client: &'a reqwest::Client,
}
