use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::DeployConfig;
use crate::error::Error;

/// Uniqueness token for a pushed image: wall-clock milliseconds since the
/// Unix epoch at push time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageTag(u128);

impl ImageTag {
    /// Fails if the system clock reads earlier than the Unix epoch.
    pub fn now() -> crate::Result<Self> {
        Self::since_epoch(SystemTime::now())
    }

    pub fn since_epoch(time: SystemTime) -> crate::Result<Self> {
        time.duration_since(UNIX_EPOCH)
            .map(|d| Self(d.as_millis()))
            .map_err(|e| Error::Clock { source: e })
    }

    pub fn from_millis(millis: u128) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully qualified ECR image reference: `<host>/<repository>:<tag>`.
///
/// The same value is used for `docker tag`, `docker push`, and the rewritten
/// task definition, so the pushed tag and the registered image always match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    host: String,
    repository: String,
    tag: ImageTag,
}

impl ImageRef {
    pub fn new(config: &DeployConfig, tag: ImageTag) -> Self {
        Self {
            host: config.registry_host(),
            repository: config.repository.clone(),
            tag,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> ImageTag {
        self.tag
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.host, self.repository, self.tag)
    }
}
