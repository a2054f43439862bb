use std::{io, process::Stdio};

use chrono::{DateTime, Utc};
use color_eyre::eyre::{Context, eyre};
use serde::Deserialize;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::errors::{Result, UserFacingError};

/// Client for the GitHub CLI, which handles authentication against the releases API on its own
#[derive(Clone, Debug)]
pub struct GhClient {
    repository: String,
}

/// A single entry of the release listing
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ReleaseTag {
    tag_name: String,
}

/// Relevant fields of a single release, as returned by `gh release view`
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GhRelease {
    pub assets: Vec<GhAsset>,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_prerelease: bool,
    #[serde(default)]
    pub name: Option<String>,
    pub published_at: DateTime<Utc>,
    pub url: String,
}

/// A single asset of a release
#[derive(Deserialize, Debug, Clone)]
pub struct GhAsset {
    pub url: String,
    pub size: u64,
}

impl GhClient {
    /// Creates a new client for the given repository, in `owner/name` form
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Lists the tags of published releases, newest first, excluding drafts and pre-releases
    #[instrument(skip_all)]
    pub async fn list_release_tags(&self, limit: u32, token: &CancellationToken) -> Result<Vec<String>> {
        let limit = limit.to_string();
        let stdout = self
            .run(
                &[
                    "release",
                    "list",
                    "--repo",
                    &self.repository,
                    "--limit",
                    &limit,
                    "--exclude-drafts",
                    "--exclude-pre-releases",
                    "--json",
                    "tagName",
                ],
                token,
            )
            .await?;
        let tags: Vec<ReleaseTag> = serde_json::from_str(&stdout).wrap_err("Couldn't parse the release listing")?;
        Ok(tags.into_iter().map(|tag| tag.tag_name).collect())
    }

    /// Fetches the details of a single release
    #[instrument(skip_all)]
    pub async fn view_release(&self, tag: &str, token: &CancellationToken) -> Result<GhRelease> {
        let stdout = self
            .run(
                &[
                    "release",
                    "view",
                    tag,
                    "--repo",
                    &self.repository,
                    "--json",
                    "assets,body,createdAt,isPrerelease,name,publishedAt,url",
                ],
                token,
            )
            .await?;
        let release = serde_json::from_str(&stdout)
            .wrap_err_with(|| format!("Couldn't parse the details of release {tag}"))?;
        Ok(release)
    }

    /// Runs a `gh` invocation, returning its stdout
    async fn run(&self, args: &[&str], token: &CancellationToken) -> Result<String> {
        tracing::debug!("Running gh {}", args.join(" "));
        let mut cmd = Command::new("gh");
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::select! {
            biased;
            // If the token is cancelled, stop waiting and drop the child
            _ = token.cancelled() => {
                tracing::info!("Cancellation token received, aborting gh invocation");
                return Err(UserFacingError::Cancelled.into());
            }
            output = cmd.output() => match output {
                Ok(output) => output,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    return Err(UserFacingError::GhNotFound.into());
                }
                Err(err) => return Err(eyre!("Couldn't run gh: {err}").into()),
            },
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("gh exited with {}: {}", output.status, stderr.trim());
            return Err(UserFacingError::GhFailed(stderr.trim().to_string()).into());
        }

        let stdout = String::from_utf8(output.stdout).wrap_err("gh returned non-utf8 output")?;
        Ok(stdout)
    }
}
