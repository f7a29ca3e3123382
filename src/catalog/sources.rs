//! Source-repository registry (`sources.xml`).

use super::xml::XmlWriter;
use serde::{Deserialize, Serialize};

const PATH_VERSION: &str = "1";

/// An external repository registered as a video source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySource {
    pub name: String,
    pub url: String,
    #[serde(default = "default_allow_sharing")]
    pub allow_sharing: bool,
}

fn default_allow_sharing() -> bool {
    true
}

impl RepositorySource {
    /// Creates a shareable source.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            allow_sharing: true,
        }
    }
}

/// The built-in repository list.
pub fn builtin() -> Vec<RepositorySource> {
    vec![
        RepositorySource::new("Diggz Repository", "https://diggzrepo.github.io/"),
        RepositorySource::new("Nixgates Repository", "https://nixgates.github.io/packages/"),
        RepositorySource::new("The Crew Repository", "https://team-crew.github.io/"),
        RepositorySource::new("Tikipeter Repository", "https://tikipeter.github.io/"),
    ]
}

/// Renders the registry.
pub fn render(sources: &[RepositorySource]) -> String {
    let default = [("pathversion", PATH_VERSION)];

    let mut w = XmlWriter::new();
    w.open("sources", &[]);

    w.open("programs", &[])
        .element("default", &default, "")
        .close("programs");

    w.open("video", &[]).element("default", &default, "");
    for source in sources {
        w.open("source", &[])
            .element("name", &[], &source.name)
            .element("path", &default, &source.url)
            .element("allowsharing", &[], &source.allow_sharing.to_string())
            .close("source");
    }
    w.close("video");

    w.close("sources");
    w.finish()
}
