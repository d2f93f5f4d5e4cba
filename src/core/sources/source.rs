use std::path::PathBuf;

use async_trait::async_trait;

use crate::core::config::InstallerConfig;
use crate::core::error::InstallerResult;

use super::ci::CiArtifactSource;
use super::context::AcquireContext;
use super::registry::RegistrySource;

/// What acquiring one mod produced. Absence is an expected outcome, not an
/// error; the orchestrator records it and keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// File persisted under the mods directory.
    Downloaded(PathBuf),
    /// No acceptable build exists anywhere this source looks.
    Unavailable,
}

#[async_trait]
pub trait ModSource: Send + Sync {
    async fn acquire(&self, ctx: AcquireContext<'_>) -> InstallerResult<AcquireOutcome>;
}

/// Dispatcher without Box<dyn>.
pub enum Source {
    Registry(RegistrySource),
    CiArtifact(CiArtifactSource),
}

impl Source {
    /// The reserved CI slug bypasses the registry entirely; everything else
    /// goes through it.
    pub fn for_slug(slug: &str, config: &InstallerConfig) -> Self {
        if slug == config.ci.mod_slug {
            Self::CiArtifact(CiArtifactSource::new(config.ci.clone()))
        } else {
            Self::Registry(RegistrySource::new(config.registry_url.clone()))
        }
    }

    pub async fn acquire(&self, ctx: AcquireContext<'_>) -> InstallerResult<AcquireOutcome> {
        match self {
            Source::Registry(source) => source.acquire(ctx).await,
            Source::CiArtifact(source) => source.acquire(ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_slug_routes_to_ci() {
        let config = InstallerConfig::default();
        assert!(matches!(
            Source::for_slug("moonrise", &config),
            Source::CiArtifact(_)
        ));
        assert!(matches!(
            Source::for_slug("sodium", &config),
            Source::Registry(_)
        ));
    }
}
