use std::{fs, io, path::Path};

use color_eyre::eyre::{Context, eyre};
use itertools::Itertools;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::{GhRelease, SyncService};
use crate::{
    errors::{Result, UserFacingError},
    model::{Artifact, ReleaseRecord, ReleaseType},
    utils::render_description,
    xml::{Element, INDENT},
};

/// Summary of a synchronization run
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// The updated document, as serialized
    pub document: String,
    /// Versions that replaced an existing entry
    pub replaced: Vec<String>,
    /// Versions that were inserted as new entries
    pub inserted: Vec<String>,
}

impl SyncService {
    /// Synchronizes the metainfo releases document at `path` with the published releases of the repository.
    ///
    /// The document is loaded and parsed before anything is fetched, and written back once after every release has
    /// been processed; any failure in between leaves the file untouched. With `dry_run` the file is not written at
    /// all and the updated document is only carried on the report.
    #[instrument(skip_all)]
    pub async fn sync(&self, path: &Path, dry_run: bool, token: &CancellationToken) -> Result<SyncReport> {
        // Load the current document, failing fast before any fetch
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(UserFacingError::MetainfoNotFound(path.to_path_buf()).into());
            }
            Err(err) => return Err(eyre!("Couldn't read {}: {err}", path.display()).into()),
        };
        let mut document = Element::parse_document(&content)
            .map_err(|err| UserFacingError::MetainfoInvalid(path.display().to_string(), format!("{err:#}")))?;

        // Fetch the listing and process it oldest first, so genuinely new versions end up newest first
        let tags = self.gh.list_release_tags(self.limit, token).await?;
        tracing::info!("Releases to synchronize: [{}]", tags.iter().join(", "));

        let mut replaced = Vec::new();
        let mut inserted = Vec::new();
        for tag in tags.iter().rev() {
            let release = self.gh.view_release(tag, token).await?;
            tracing::debug!(
                "Release {tag} ({}) created at {}",
                release.name.as_deref().unwrap_or(tag),
                release.created_at
            );
            let record = build_record(self.repository(), tag, &release);
            tracing::info!(
                "  Version: {} ({}, {}, {} artifacts)",
                record.version,
                record.date,
                record.release_type,
                record.artifacts.len()
            );
            let version = record.version.clone();
            if merge_release(&mut document, record.into_element()) {
                replaced.push(version);
            } else {
                inserted.push(version);
            }
        }

        // Serialize once, with stable indentation and a trailing newline
        document.indent(INDENT);
        let serialized = document.to_document_string()?;
        if !dry_run {
            fs::write(path, &serialized).wrap_err_with(|| format!("Couldn't write {}", path.display()))?;
        }

        Ok(SyncReport {
            document: serialized,
            replaced,
            inserted,
        })
    }
}

/// Builds the release record out of the metadata fetched for a tag
fn build_record(repository: &str, tag: &str, release: &GhRelease) -> ReleaseRecord {
    // A single leading `v` belongs to the tag, not the version
    let version = tag.strip_prefix('v').unwrap_or(tag).to_string();
    // The listing already excludes pre-releases, but the flag is still honored in case one slips through
    let release_type = if release.is_prerelease {
        ReleaseType::Snapshot
    } else {
        ReleaseType::Stable
    };
    let mut artifacts = vec![Artifact::source(repository, tag)];
    artifacts.extend(
        release
            .assets
            .iter()
            .filter_map(|asset| Artifact::classify(&asset.url, asset.size)),
    );
    ReleaseRecord {
        version,
        date: release.published_at.date_naive(),
        release_type,
        url: release.url.clone(),
        description: render_description(&release.body),
        artifacts,
    }
}

/// Merges a release element into the document root.
///
/// An existing entry with the same version is replaced in place, keeping its position; a new version is inserted at
/// the front. Returns whether an entry was replaced.
fn merge_release(root: &mut Element, release: Element) -> bool {
    let version = release.attr("version").map(str::to_owned);
    match root
        .children
        .iter_mut()
        .find(|child| child.attr("version").is_some_and(|v| Some(v) == version.as_deref()))
    {
        Some(existing) => {
            *existing = release;
            true
        }
        None => {
            root.children.insert(0, release);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::ArtifactType;

    fn release_fixture(json: serde_json::Value) -> GhRelease {
        serde_json::from_value(json).unwrap()
    }

    fn versions(root: &Element) -> Vec<&str> {
        root.children.iter().filter_map(|child| child.attr("version")).collect()
    }

    #[test]
    fn test_build_record_example_release() {
        let release = release_fixture(serde_json::json!({
            "assets": [
                {"url": "https://github.com/kjarosh/ruffle/releases/download/v1.2.0/ruffle-1.2.0-linux-x86_64.tar.gz",
                 "size": 1000},
                {"url": "https://github.com/kjarosh/ruffle/releases/download/v1.2.0/ruffle-1.2.0-readme.txt",
                 "size": 5},
            ],
            "body": "**Fixed** bugs.",
            "createdAt": "2024-05-16T20:10:00Z",
            "isPrerelease": false,
            "name": "v1.2.0",
            "publishedAt": "2024-05-17T08:30:00Z",
            "url": "https://github.com/kjarosh/ruffle/releases/tag/v1.2.0",
        }));
        let record = build_record("kjarosh/ruffle", "v1.2.0", &release);

        assert_eq!(record.version, "1.2.0");
        assert_eq!(record.date.to_string(), "2024-05-17");
        assert_eq!(record.release_type, ReleaseType::Stable);
        assert_eq!(record.url, "https://github.com/kjarosh/ruffle/releases/tag/v1.2.0");
        assert_eq!(
            record.description.to_fragment_string().unwrap(),
            "<description><p><em>Fixed</em> bugs.</p></description>"
        );
        // The readme asset is ignored: only the source archive and the recognized binary remain
        assert_eq!(record.artifacts.len(), 2);
        assert_eq!(record.artifacts[0].kind, ArtifactType::Source);
        assert_eq!(record.artifacts[0].filename, "ruffle-v1.2.0.zip");
        assert_eq!(record.artifacts[1].kind, ArtifactType::Binary);
        assert_eq!(record.artifacts[1].platform, Some("x86_64-linux-gnu"));
        assert_eq!(record.artifacts[1].size, Some(1000));
    }

    #[test]
    fn test_build_record_strips_a_single_leading_v() {
        let release = release_fixture(serde_json::json!({
            "assets": [],
            "createdAt": "2024-05-16T20:10:00Z",
            "isPrerelease": false,
            "publishedAt": "2024-05-17T08:30:00Z",
            "url": "https://github.com/kjarosh/ruffle/releases/tag/vv1.0",
        }));
        assert_eq!(build_record("kjarosh/ruffle", "vv1.0", &release).version, "v1.0");
        assert_eq!(build_record("kjarosh/ruffle", "1.0", &release).version, "1.0");
    }

    #[test]
    fn test_build_record_still_honors_the_prerelease_flag() {
        // The release listing excludes pre-releases, so this flag can't be set through the regular flow; it is
        // still mapped to the snapshot type in case one slips through
        let release = release_fixture(serde_json::json!({
            "assets": [],
            "createdAt": "2024-05-16T20:10:00Z",
            "isPrerelease": true,
            "publishedAt": "2024-05-17T08:30:00Z",
            "url": "https://github.com/kjarosh/ruffle/releases/tag/v1.3.0-rc1",
        }));
        let record = build_record("kjarosh/ruffle", "v1.3.0-rc1", &release);
        assert_eq!(record.release_type, ReleaseType::Snapshot);
    }

    #[test]
    fn test_merge_inserts_new_versions_at_the_front() {
        let mut root = Element::parse_document(r#"<releases><release version="1.0"/></releases>"#).unwrap();
        let mut release = Element::new("release");
        release.set_attr("version", "1.1");
        assert!(!merge_release(&mut root, release));
        assert_eq!(versions(&root), vec!["1.1", "1.0"]);
    }

    #[test]
    fn test_merge_replaces_matching_versions_in_place() {
        let mut root = Element::parse_document(
            r#"<releases><release version="1.2"/><release version="1.1"/><release version="1.0"/></releases>"#,
        )
        .unwrap();
        let mut release = Element::new("release");
        release.set_attr("version", "1.1");
        release.children.push(Element::with_text("url", "https://example.org"));
        assert!(merge_release(&mut root, release));
        assert_eq!(versions(&root), vec!["1.2", "1.1", "1.0"]);
        assert_eq!(root.children[1].children[0].text, "https://example.org");
    }

    #[test]
    fn test_merge_keeps_untouched_entries() {
        let mut root = Element::parse_document(
            r#"<releases><release version="0.9" date="2020-01-01" type="stable"/></releases>"#,
        )
        .unwrap();
        let mut release = Element::new("release");
        release.set_attr("version", "1.0");
        merge_release(&mut root, release);
        assert_eq!(versions(&root), vec!["1.0", "0.9"]);
        assert_eq!(root.children[1].attr("date"), Some("2020-01-01"));
    }

    #[test]
    fn test_merge_is_idempotent_at_document_level() {
        let release = release_fixture(serde_json::json!({
            "assets": [
                {"url": "https://github.com/kjarosh/ruffle/releases/download/v1.2.0/ruffle-1.2.0-windows-x86_64.zip",
                 "size": 2000},
            ],
            "body": "- Fixed *many* bugs\n- Added stuff",
            "createdAt": "2024-05-16T20:10:00Z",
            "isPrerelease": false,
            "publishedAt": "2024-05-17T08:30:00Z",
            "url": "https://github.com/kjarosh/ruffle/releases/tag/v1.2.0",
        }));

        let mut document = Element::parse_document(
            "<releases>\n    <release version=\"1.0\" date=\"2020-01-01\" type=\"stable\"/>\n</releases>",
        )
        .unwrap();
        merge_release(&mut document, build_record("kjarosh/ruffle", "v1.2.0", &release).into_element());
        document.indent(INDENT);
        let first = document.to_document_string().unwrap();

        // Applying the same release over the first run's output must not change a byte
        let mut document = Element::parse_document(&first).unwrap();
        merge_release(&mut document, build_record("kjarosh/ruffle", "v1.2.0", &release).into_element());
        document.indent(INDENT);
        let second = document.to_document_string().unwrap();
        assert_eq!(first, second);
    }
}
