mod github;
mod sync;

pub use github::{GhAsset, GhClient, GhRelease};
pub use sync::SyncReport;

/// Service synchronizing the metainfo releases document with the published releases of a repository
#[derive(Clone, Debug)]
pub struct SyncService {
    gh: GhClient,
    limit: u32,
}

impl SyncService {
    /// Creates a new instance of the service
    pub fn new(repository: impl Into<String>, limit: u32) -> Self {
        Self {
            gh: GhClient::new(repository),
            limit,
        }
    }

    /// Overrides the repository releases are fetched from, if one is given
    pub fn with_repository(mut self, repository: Option<String>) -> Self {
        if let Some(repository) = repository {
            self.gh = GhClient::new(repository);
        }
        self
    }

    /// Overrides the maximum number of releases to fetch, if a limit is given
    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        if let Some(limit) = limit {
            self.limit = limit;
        }
        self
    }

    /// Repository releases are fetched from, in `owner/name` form
    pub fn repository(&self) -> &str {
        self.gh.repository()
    }
}
