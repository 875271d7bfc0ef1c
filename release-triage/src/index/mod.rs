//! Package index lookups.

mod error;
mod pypi;

pub use error::IndexError;
pub use pypi::PyPiIndex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The most recent published version of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: String,
    pub published_at: DateTime<Utc>,
}

/// Looks up published package versions.
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Returns the latest release, or `None` if the package was never published.
    async fn last_released(&self, package: &str) -> Result<Option<Release>, IndexError>;
}
