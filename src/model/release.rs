use chrono::NaiveDate;

use crate::{model::Artifact, xml::Element};

/// Type of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReleaseType {
    Stable,
    Snapshot,
}

/// A single versioned release entry of the metainfo document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    /// Version identifying the release, the tag without its leading `v`
    pub version: String,
    /// Publication date, at day precision
    pub date: NaiveDate,
    pub release_type: ReleaseType,
    /// Canonical URL of the release page
    pub url: String,
    /// Sanitized description fragment rendered from the release notes
    pub description: Element,
    /// Source archive plus any recognized binary, in publication order
    pub artifacts: Vec<Artifact>,
}

impl ReleaseRecord {
    /// Builds the `release` element of this record
    pub fn into_element(self) -> Element {
        let mut release = Element::new("release");
        release.set_attr("version", self.version);
        release.set_attr("date", self.date.format("%Y-%m-%d").to_string());
        release.set_attr("type", self.release_type.to_string());
        release.children.push(Element::with_text("url", self.url));
        release.children.push(self.description);
        let mut artifacts = Element::new("artifacts");
        for artifact in self.artifacts {
            artifacts.children.push(artifact.into_element());
        }
        release.children.push(artifacts);
        release
    }
}
