//! Tests for the configuration catalog.

use mediaboot::catalog::addons::{SEREN, THE_CREW, TMDB_HELPER};
use mediaboot::catalog::{AddonSettings, FavouriteGroup, RepositorySource, escape};
use mediaboot::constants::{ADVANCED_SETTINGS_PATH, FAVOURITES_PATH, SOURCES_PATH};
use mediaboot::{Catalog, Error};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Built-in Catalog
// =============================================================================

#[test]
fn test_builtin_is_valid() {
    Catalog::builtin().validate().unwrap();
}

#[test]
fn test_builtin_addons() {
    let catalog = Catalog::builtin();
    let ids: Vec<_> = catalog.addon_ids().collect();

    assert_eq!(ids.len(), 8);
    assert_eq!(ids[0], SEREN);
    assert_eq!(ids[7], TMDB_HELPER);
}

#[test]
fn test_every_addon_has_a_shortcut() {
    let catalog = Catalog::builtin();
    let launched: HashSet<_> = catalog
        .favourites
        .iter()
        .flat_map(|g| &g.entries)
        .filter_map(|f| f.addon_id())
        .collect();

    for id in catalog.addon_ids() {
        assert!(launched.contains(id), "no favourite launches {id}");
    }
}

#[test]
fn test_premium_credentials_never_shipped() {
    for addon in Catalog::builtin().addons {
        assert!(!addon.premium.is_empty(), "{} has no premium slot", addon.id);
        let doc = addon.render();
        for toggle in &addon.premium {
            assert!(doc.contains(&format!(
                r#"<setting id="{}" value="" />"#,
                toggle.credential_key
            )));
        }
    }
}

#[test]
fn test_document_paths() {
    let paths: Vec<PathBuf> = Catalog::builtin()
        .documents()
        .into_iter()
        .map(|d| d.path)
        .collect();

    assert_eq!(paths.len(), 11);
    assert_eq!(paths[0], Path::new(ADVANCED_SETTINGS_PATH));
    assert_eq!(
        paths[1],
        Path::new("userdata/addon_data/plugin.video.seren/settings.xml")
    );
    assert_eq!(paths[9], Path::new(SOURCES_PATH));
    assert_eq!(paths[10], Path::new(FAVOURITES_PATH));
}

#[test]
fn test_documents_are_deterministic() {
    assert_eq!(Catalog::builtin().documents(), Catalog::builtin().documents());
}

#[test]
fn test_favourites_group_headers() {
    let docs = Catalog::builtin().addon_documents();
    let favourites = &docs.last().unwrap().contents;

    for label in ["MOVIES &amp; TV", "SPORTS", "UTILITIES", "SETUP"] {
        assert!(favourites.contains(label), "missing group {label}");
    }
    assert!(favourites.contains(">noop</favourite>"));
}

// =============================================================================
// Escaping
// =============================================================================

#[test]
fn test_escape() {
    assert_eq!(escape("plain"), "plain");
    assert_eq!(escape("a & b"), "a &amp; b");
    assert_eq!(escape(r#"<"x">'y'"#), "&lt;&quot;x&quot;&gt;&apos;y&apos;");
}

#[test]
fn test_escaped_values_in_documents() {
    let mut catalog = Catalog::builtin();
    catalog.sources = vec![RepositorySource::new("A <B> & C", "https://x.test/?a=1&b=2")];
    catalog.addons = vec![AddonSettings::new("plugin.video.x")];
    catalog.favourites = vec![FavouriteGroup::new("R&B", "blue")];

    let docs = catalog.addon_documents();
    let sources = &docs[1].contents;
    let favourites = &docs[2].contents;

    assert!(sources.contains("A &lt;B&gt; &amp; C"));
    assert!(sources.contains("https://x.test/?a=1&amp;b=2"));
    assert!(favourites.contains("[COLOR blue]R&amp;B[/COLOR]"));
}

// =============================================================================
// JSON Overrides
// =============================================================================

#[test]
fn test_partial_override_keeps_builtin_sections() {
    let catalog = Catalog::from_json_str(r#"{ "sources": [] }"#).unwrap();

    assert!(catalog.sources.is_empty());
    assert_eq!(catalog.addons, Catalog::builtin().addons);
    assert_eq!(catalog.favourites, Catalog::builtin().favourites);
}

#[test]
fn test_override_advanced_settings() {
    let catalog =
        Catalog::from_json_str(r#"{ "advanced": { "network": { "curl_retries": 5 } } }"#).unwrap();
    let doc = &catalog.engine_documents()[0].contents;

    assert!(doc.contains("<curlretries>5</curlretries>"));
    assert!(doc.contains("<buffermode>1</buffermode>"));
}

#[test]
fn test_from_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, r#"{ "addons": [ { "id": "plugin.video.thecrew" } ] }"#).unwrap();

    let catalog = Catalog::from_json_file(&path).unwrap();
    assert_eq!(catalog.addon_ids().collect::<Vec<_>>(), [THE_CREW]);
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        Catalog::from_json_str("{ not json"),
        Err(Error::Serialization(_))
    ));
}

#[test]
fn test_rejects_unsafe_addon_ids() {
    for id in ["", "..", "a/b", "a\\b", "/abs", "."] {
        let json = format!(r#"{{ "addons": [ {{ "id": "{}" }} ] }}"#, id.replace('\\', "\\\\"));
        assert!(
            matches!(Catalog::from_json_str(&json), Err(Error::InvalidCatalog(_))),
            "accepted id {id:?}"
        );
    }
}

#[test]
fn test_rejects_duplicate_addon_ids() {
    let mut catalog = Catalog::builtin();
    catalog.addons.push(AddonSettings::new(SEREN));

    assert!(matches!(catalog.validate(), Err(Error::InvalidCatalog(_))));
}
