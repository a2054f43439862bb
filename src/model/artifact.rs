use crate::{utils::filename_from_url, xml::Element};

/// Mapping from release asset filename suffix to the platform triple it targets.
///
/// Assets whose filename matches none of the suffixes are not published as artifacts.
const PLATFORM_SUFFIXES: [(&str, &str); 4] = [
    ("-linux-x86_64.tar.gz", "x86_64-linux-gnu"),
    ("-windows-x86_32.zip", "i386-windows-msvc"),
    ("-windows-x86_64.zip", "x86_64-windows-msvc"),
    ("-macos-universal.tar.gz", "any-macos-any"),
];

/// Type of a release artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ArtifactType {
    Source,
    Binary,
}

/// A single downloadable file of a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactType,
    /// Platform triple the artifact targets, only present on binaries
    pub platform: Option<&'static str>,
    pub location: String,
    pub filename: String,
    /// Download size in bytes, only present on binaries
    pub size: Option<u64>,
}

impl Artifact {
    /// Builds the source archive artifact of a release tag
    pub fn source(repository: &str, tag: &str) -> Self {
        let project = repository.rsplit('/').next().unwrap_or(repository);
        Self {
            kind: ArtifactType::Source,
            platform: None,
            location: format!("https://github.com/{repository}/archive/refs/tags/{tag}.zip"),
            filename: format!("{project}-{tag}.zip"),
            size: None,
        }
    }

    /// Classifies a release asset by its filename suffix, returning [None] for assets that are not published
    /// binaries
    pub fn classify(url: &str, size: u64) -> Option<Self> {
        let filename = filename_from_url(url);
        let (_, platform) = PLATFORM_SUFFIXES.iter().copied().find(|(suffix, _)| filename.ends_with(suffix))?;
        Some(Self {
            kind: ArtifactType::Binary,
            platform: Some(platform),
            location: url.to_string(),
            filename: filename.to_string(),
            size: Some(size),
        })
    }

    /// Builds the `artifact` element of this artifact
    pub fn into_element(self) -> Element {
        let mut artifact = Element::new("artifact");
        artifact.set_attr("type", self.kind.to_string());
        if let Some(platform) = self.platform {
            artifact.set_attr("platform", platform);
        }
        artifact.children.push(Element::with_text("location", self.location));
        artifact.children.push(Element::with_text("filename", self.filename));
        if let Some(size) = self.size {
            let mut size_element = Element::with_text("size", size.to_string());
            size_element.set_attr("type", "download");
            artifact.children.push(size_element);
        }
        artifact
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const DOWNLOAD_BASE: &str = "https://github.com/kjarosh/ruffle/releases/download/v1.2.0";

    #[test]
    fn test_classify_known_suffixes() {
        let cases = [
            ("ruffle-1.2.0-linux-x86_64.tar.gz", "x86_64-linux-gnu"),
            ("ruffle-1.2.0-windows-x86_32.zip", "i386-windows-msvc"),
            ("ruffle-1.2.0-windows-x86_64.zip", "x86_64-windows-msvc"),
            ("ruffle-1.2.0-macos-universal.tar.gz", "any-macos-any"),
        ];
        for (filename, platform) in cases {
            let url = format!("{DOWNLOAD_BASE}/{filename}");
            let artifact = Artifact::classify(&url, 1000).unwrap();
            assert_eq!(artifact.kind, ArtifactType::Binary);
            assert_eq!(artifact.platform, Some(platform));
            assert_eq!(artifact.location, url);
            assert_eq!(artifact.filename, filename);
            assert_eq!(artifact.size, Some(1000));
        }
    }

    #[test]
    fn test_classify_ignores_unknown_suffixes() {
        for filename in ["ruffle-1.2.0-readme.txt", "ruffle-1.2.0.sha512", "ruffle-1.2.0-linux-x86_64.tar.gz.asc"] {
            let url = format!("{DOWNLOAD_BASE}/{filename}");
            assert_eq!(Artifact::classify(&url, 1000), None);
        }
    }

    #[test]
    fn test_classify_depends_on_the_filename_only() {
        let a = Artifact::classify(&format!("{DOWNLOAD_BASE}/app-linux-x86_64.tar.gz"), 1).unwrap();
        let b = Artifact::classify("https://mirror.example.org/path/app-linux-x86_64.tar.gz", 1).unwrap();
        assert_eq!(a.platform, b.platform);
        assert_eq!(a.kind, b.kind);
    }

    #[test]
    fn test_source_artifact() {
        let artifact = Artifact::source("kjarosh/ruffle", "v1.2.0");
        assert_eq!(artifact.kind, ArtifactType::Source);
        assert_eq!(artifact.platform, None);
        assert_eq!(artifact.location, "https://github.com/kjarosh/ruffle/archive/refs/tags/v1.2.0.zip");
        assert_eq!(artifact.filename, "ruffle-v1.2.0.zip");
        assert_eq!(artifact.size, None);
    }

    #[test]
    fn test_binary_artifact_element() {
        let url = format!("{DOWNLOAD_BASE}/ruffle-1.2.0-linux-x86_64.tar.gz");
        let element = Artifact::classify(&url, 1000).unwrap().into_element();
        assert_eq!(
            element.to_fragment_string().unwrap(),
            format!(
                "<artifact type=\"binary\" platform=\"x86_64-linux-gnu\"><location>{url}</location>\
                 <filename>ruffle-1.2.0-linux-x86_64.tar.gz</filename><size type=\"download\">1000</size></artifact>"
            )
        );
    }

    #[test]
    fn test_source_artifact_element() {
        let element = Artifact::source("kjarosh/ruffle", "v1.2.0").into_element();
        assert_eq!(
            element.to_fragment_string().unwrap(),
            "<artifact type=\"source\"><location>https://github.com/kjarosh/ruffle/archive/refs/tags/v1.2.0.zip\
             </location><filename>ruffle-v1.2.0.zip</filename></artifact>"
        );
    }
}
