// ─── Modkit Core ───
// Modular backend for the automated Fabric mod installer.
//
// Architecture:
//   core/
//     compat.rs   — version compatibility resolver
//     config.rs   — explicit configuration object (no global constants)
//     downloader/ — streaming downloads with checksum validation
//     sources/    — registry + CI-artifact mod acquisition
//     loader.rs   — Fabric installer subprocess
//     profile.rs  — launcher_profiles.json writer
//     workflow.rs — end-to-end orchestration with rollback

pub mod compat;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod loader;
pub mod paths;
pub mod profile;
pub mod progress;
pub mod sources;
pub mod workflow;
