// ─── Launcher Profile ───
// Reads-or-creates launcher_profiles.json and merges in one entry under a
// fixed key. Unrelated profiles always survive; a prior entry under our key
// is overwritten.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::paths;

/// The one profile entry this tool owns.
pub const PROFILE_KEY: &str = "fabric-modded";

const PROFILE_TYPE: &str = "custom";

/// JVM flags tuned for a modded client; written verbatim into the profile.
const JAVA_ARGS: &str = "-Xmx2G -XX:+UnlockExperimentalVMOptions -XX:+UseG1GC \
-XX:G1NewSizePercent=20 -XX:G1ReservePercent=20 -XX:MaxGCPauseMillis=50 \
-XX:G1HeapRegionSize=32M";

/// 32x32 PNG shown next to the profile in the launcher.
const PROFILE_ICON: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAACAAAAAgCAYAAABzenr0AAAACXBIWXMAAADsAAAA7AF5KHG9AAAAGXRFWHRTb2Z0d2FyZQB3d3cuaW5rc2NhcGUub3Jnm+48GgAABm5JREFUWMPdVwlQU1cUxeky05ku05k6bRWS/E/I0h+ymgQCSJQlJgFZwq7VgNgwbiigdWdTiOICRaqoKBVUCi5tta1aLYvBijIqiHQKdrAEcEGgVVo3mNv/viQFpEIVO51m5s0k/7+8c+65557k29j8118z/TjHVxqIKkMo9yyTyRz7wgHZdnbjJBLJK+i9hMXibE8UtEKtK1wskfVIBXikZR+O47RRB/fzdIjIXs5vjQ7mmOZFcI8XbxTd6rnoAogAWqW7JtyJm0FUhmvZx3ITBR1BKpZx1MBZtrbjs5Y6tlnARrLK8ifc1Uxkh4wKASR7dBCnsj/AvfMKqDsshSM5YqgqkkB3lWIAgdT5jnUikd24UVNhbjj3hOXwm2VOYFymgZ1bM+B0eTnsL8iF5AQd1H8psxJInserVdrYvDw6CpCG+zxDdMtSuXGpGszNZrhz5651dXZ2QdLiMOisdKII/HRE/miKi4PhucH1/pwT25MENyyGq/tCRlXeH9yyKk0VUJL5VysObha3R+o4VwiCePWZCSTPcazu39sjn4rBVFExJIH29tuwYbnnAC/kJQtbybF86zl6zzl/ofiv3lbtl1A9H4pATU0t5K9zs+5tOCqHxVGE2dbW9rX+Z+J2uBSn4Z5ouoYlgBJOToZM2W7pb+jQ7ipnynCo54MJpK82QNspeZ9RnUHtxszGMIw+eKSNTsrOH6YEgUEoLR2xEnF6wmSpDLkdGa7SdBpu3+6gKk9fHQOl+c7Qe+nxno0Jjo1sNvsN8qtjwniirCBCuMWbzYsyCOWljT7Ten4NjIKSST4t0/iifWIGU6Xni4+puDzt3+GPme7L/rZ/b5HbkeEylnlQsqPKLeBoJeiJaiQ9Ar+gDrnfQIJe0oZRwP1XR0AklHnpHnYE6CHTxaPZHSekT6AjGfNSBB3/JAnR74PKFY/U8YTrazVhjyyAN/1nQr06DEzegdDkMw0QsOXeFoVXkxdBCIeUAGX7yZ2S7pQFvCsoZEiDPeoPiHq+6WPHxniy8pqD8p4IH9Zh8msvqVjEjGp1CEWgQRsBqYFhkJtuhIMFe8G4MB7yNDpo939MIkXmVvfUkVW7sYMkEvr7KOFQyBzMFN1E4I1fy3uQ4YixxOtIdlQ5AmeOZ9rOJo32uHI9rAkMhZaW1gHGRUQOTdFRBC5rw3s82NxVIx5bMqRqdyQLr8VHfnBtsNsdGAzhRsXkrqu+03ofVx8OOSlrhxzfdRF6uNWnwhlV0IPZQtnZERFActFotLeZbppoTBmww16pmWIdNxrNtdxbZ+3vOVUQ7N+xY0gC66Nj4LrfTOveFVLX88OCM4RODBaL9Q5Z+btY6MKL9MPtgGn1FWRuvNl3jxMtkJ4qnKhuRoc2T50OaXNjnwC/fv0GZPgHU9OADLlYoqid4SjOfio4LlNOYESuuorPSmrEFmSZ6UW/ACJAL2gALCb9Z2zehmt48NxaW4Hz+FBC9Bnqf1dAFBRqgmDvtu1W8La267BSPwvqyfb05UKXE5MrHrZ6bKI2nr7FdI8CPXQT7PY0AC2zHOwKr5Kf2ykyjJTiTlym0gqZHOUxT7/7CAC5/RvScOkh0yEjygAZU4PhR004dPVJHytWVKPMGT6eRVJ3etpXd+kHboB0eS7Ep2TAnqIDELNiLTim7CdJ3AJGXHYbg8F4L4InPnablLd/+CAiKA86Bl0/6RX4YLIDEf50+Sf7ReI+UdUIBNtcCjm7Cgf0NGHNRrDLqwPUFnvvEJNEqkxIc3JvQiGzXOZac04d+tACiIgVKbWdsWKns0c9/P74kC/+fvAP15MEdHO+o6Qnl2RxFpjNLQMInDZVAp5aApY99hp90SSmgFBy+TyUDe4s7qKT3gG/IwJLJK41E+y56LqNO5PjOyw41X+vkHwsYasZHc5K2gcVpjMDCGzLLwS7T05TbcAMaU24R0jagNElw+ojobQsVeZeMYMvyXym/whMmeciRt6lHlpRM2jmroBLNZcp8FPlJpgUuwboJW1ANx7pthcrJr+QBxRM7OLGWL23C6lA29cE/GW54L5gDfASC4FW3EJJj8UYzeP5ctsXQ4AcQ2zTybv0nDO9jIKr1n5Ta3ddL337hV5sRUE7GsMX9phmr/Rfaa/wnk/GcBoWl9NEzX50cr29m2oJrvRJZE70nfWvPaTiXqG7sfC4KtwzON3m//T6Ewq34MneR/ItAAAAAElFTkSuQmCC";

/// One record in the launcher's `profiles` map. Field names follow the
/// launcher's camelCase document format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherProfile {
    pub name: String,
    #[serde(rename = "type")]
    pub profile_type: String,
    pub icon: String,
    pub created: DateTime<Utc>,
    pub last_version_id: String,
    pub game_dir: PathBuf,
    pub java_args: String,
}

impl LauncherProfile {
    pub fn fabric(
        minecraft_dir: &Path,
        minecraft_version: &str,
        fabric_version: &str,
    ) -> Self {
        Self {
            name: format!("Optimized {minecraft_version}"),
            profile_type: PROFILE_TYPE.to_string(),
            icon: PROFILE_ICON.to_string(),
            created: Utc::now(),
            last_version_id: last_version_id(fabric_version, minecraft_version),
            game_dir: minecraft_dir.to_path_buf(),
            java_args: JAVA_ARGS.to_string(),
        }
    }
}

/// The version id the launcher resolves: `fabric-loader-<loader>-<game>`.
pub fn last_version_id(fabric_version: &str, minecraft_version: &str) -> String {
    format!("fabric-loader-{fabric_version}-{minecraft_version}")
}

pub struct ProfileWriter {
    path: PathBuf,
}

impl ProfileWriter {
    pub fn new(minecraft_dir: &Path) -> Self {
        Self {
            path: paths::launcher_profiles_path(minecraft_dir),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge `profile` into the document under [`PROFILE_KEY`] and rewrite
    /// the whole file. A missing or unparseable document starts empty;
    /// failing to write propagates.
    pub async fn write(&self, profile: &LauncherProfile) -> InstallerResult<()> {
        let mut document = self.load_document().await;

        let profiles = document
            .entry("profiles".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !profiles.is_object() {
            warn!("Replacing malformed 'profiles' value in {:?}", self.path);
            *profiles = Value::Object(Map::new());
        }
        if let Some(map) = profiles.as_object_mut() {
            map.insert(PROFILE_KEY.to_string(), serde_json::to_value(profile)?);
        }

        let raw = serde_json::to_string_pretty(&Value::Object(document))?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| InstallerError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|source| InstallerError::Io {
                path: self.path.clone(),
                source,
            })?;

        info!("Profile {:?} written to {:?}", PROFILE_KEY, self.path);
        Ok(())
    }

    /// Existing document, or an empty one. Unreadable and unparseable files
    /// are treated as empty, not as failures.
    async fn load_document(&self) -> Map<String, Value> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return Map::new(),
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(
                    "Unparseable {:?}, starting from an empty document",
                    self.path
                );
                Map::new()
            }
        }
    }
}
