//! # Configuration Catalog
//!
//! The catalog is the complete, enumerable description of every
//! configuration document a provisioning run writes:
//!
//! | Document                                       | Source                |
//! |------------------------------------------------|-----------------------|
//! | `userdata/advancedsettings.xml`                | [`AdvancedSettings`]  |
//! | `userdata/addon_data/<id>/settings.xml`        | [`AddonSettings`]     |
//! | `userdata/sources.xml`                         | [`RepositorySource`]  |
//! | `userdata/favourites.xml`                      | [`FavouriteGroup`]    |
//!
//! Generation is a pure function of the catalog: the same catalog always
//! produces the same documents at the same paths with the same bytes.
//!
//! ## Overrides
//!
//! [`Catalog::builtin`] is the table this deployment ships. Hosts can
//! replace any part of it from JSON; missing top-level fields fall back to
//! the built-in values:
//!
//! ```json
//! { "sources": [ { "name": "Local", "url": "smb://nas/media/" } ] }
//! ```

pub mod addons;
pub mod advanced;
pub mod favourites;
pub mod sources;
mod xml;

pub use addons::{AddonSettings, PremiumToggle, Setting};
pub use advanced::{AdvancedSettings, AudioSettings, GuiSettings, NetworkSettings, VideoSettings};
pub use favourites::{Favourite, FavouriteGroup};
pub use sources::RepositorySource;
pub use xml::escape;

use crate::constants::{
    ADDON_DATA_DIR, ADDON_SETTINGS_FILE, ADVANCED_SETTINGS_PATH, FAVOURITES_PATH, SOURCES_PATH,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// A generated document and its root-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    pub path: PathBuf,
    pub contents: String,
}

impl ConfigDocument {
    fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

/// Everything the provisioner writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub advanced: AdvancedSettings,
    pub addons: Vec<AddonSettings>,
    pub sources: Vec<RepositorySource>,
    pub favourites: Vec<FavouriteGroup>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The catalog this deployment ships.
    pub fn builtin() -> Self {
        Self {
            advanced: AdvancedSettings::default(),
            addons: addons::builtin(),
            sources: sources::builtin(),
            favourites: favourites::builtin(),
        }
    }

    /// Parses and validates a JSON catalog.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reads, parses and validates a JSON catalog file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks that addon ids are usable as directory names and unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for addon in &self.addons {
            let mut components = Path::new(&addon.id).components();
            let single_component = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if addon.id.is_empty() || !single_component || addon.id.contains(['/', '\\']) {
                return Err(Error::InvalidCatalog(format!(
                    "addon id '{}' is not a single path component",
                    addon.id
                )));
            }
            if !seen.insert(addon.id.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate addon id '{}'",
                    addon.id
                )));
            }
        }
        Ok(())
    }

    /// Returns the addon ids in catalog order.
    pub fn addon_ids(&self) -> impl Iterator<Item = &str> {
        self.addons.iter().map(|a| a.id.as_str())
    }

    /// Root-relative path of an addon's settings document.
    pub fn addon_settings_path(addon_id: &str) -> PathBuf {
        Path::new(ADDON_DATA_DIR).join(addon_id).join(ADDON_SETTINGS_FILE)
    }

    /// Engine-wide documents (provisioning phase A).
    pub fn engine_documents(&self) -> Vec<ConfigDocument> {
        vec![ConfigDocument::new(ADVANCED_SETTINGS_PATH, self.advanced.render())]
    }

    /// Addon and registry documents (provisioning phase B).
    pub fn addon_documents(&self) -> Vec<ConfigDocument> {
        let mut docs: Vec<ConfigDocument> = self
            .addons
            .iter()
            .map(|addon| ConfigDocument::new(Self::addon_settings_path(&addon.id), addon.render()))
            .collect();

        docs.push(ConfigDocument::new(SOURCES_PATH, sources::render(&self.sources)));
        docs.push(ConfigDocument::new(FAVOURITES_PATH, favourites::render(&self.favourites)));
        docs
    }

    /// All documents, phase A first.
    pub fn documents(&self) -> Vec<ConfigDocument> {
        let mut docs = self.engine_documents();
        docs.extend(self.addon_documents());
        docs
    }
}
