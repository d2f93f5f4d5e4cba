// ─── Launcher Paths ───
// Resolves the vanilla launcher's directory layout on each platform.

use std::path::{Path, PathBuf};

use crate::core::error::{InstallerError, InstallerResult};

/// The launcher's game directory: `%APPDATA%\.minecraft` on Windows,
/// `~/Library/Application Support/minecraft` on macOS, `~/.minecraft`
/// elsewhere.
pub fn minecraft_dir() -> InstallerResult<PathBuf> {
    let dir = if cfg!(target_os = "windows") {
        dirs::config_dir().map(|base| base.join(".minecraft"))
    } else if cfg!(target_os = "macos") {
        dirs::config_dir().map(|base| base.join("minecraft"))
    } else {
        dirs::home_dir().map(|base| base.join(".minecraft"))
    };

    dir.ok_or(InstallerError::MinecraftDirUnresolved)
}

/// Where downloaded mod jars land.
pub fn mods_dir(minecraft_dir: &Path) -> PathBuf {
    minecraft_dir.join("mods")
}

/// The version directory the Fabric installer creates for one
/// loader/game-version pair.
pub fn loader_version_dir(
    minecraft_dir: &Path,
    fabric_version: &str,
    minecraft_version: &str,
) -> PathBuf {
    minecraft_dir
        .join("versions")
        .join(format!("fabric-loader-{fabric_version}-{minecraft_version}"))
}

pub fn launcher_profiles_path(minecraft_dir: &Path) -> PathBuf {
    minecraft_dir.join("launcher_profiles.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_version_dir_matches_installer_layout() {
        let dir = loader_version_dir(Path::new("/tmp/.minecraft"), "0.15.11", "1.21");
        assert_eq!(
            dir,
            Path::new("/tmp/.minecraft/versions/fabric-loader-0.15.11-1.21")
        );
    }

    #[test]
    fn mods_dir_is_a_direct_child() {
        assert_eq!(
            mods_dir(Path::new("/home/user/.minecraft")),
            Path::new("/home/user/.minecraft/mods")
        );
    }
}
