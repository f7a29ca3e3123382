//! Per-addon settings documents.
//!
//! Each addon gets `userdata/addon_data/<id>/settings.xml` holding:
//! - premium-accelerator toggles, always rendered disabled with an empty
//!   credential field next to each
//! - timeouts
//! - feature toggles (quality ceiling, categories, companion services)
//!
//! Premium toggles are kept apart from ordinary settings so that no catalog
//! entry can ship one enabled or pre-filled.

use super::xml::XmlWriter;
use serde::{Deserialize, Serialize};

/// Settings schema version written on the root element.
const SETTINGS_VERSION: &str = "2";

/// A single `<setting id=".." value=".." />` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub id: String,
    pub value: String,
}

impl Setting {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    pub fn flag(id: impl Into<String>, enabled: bool) -> Self {
        Self::new(id, enabled.to_string())
    }

    pub fn seconds(id: impl Into<String>, secs: u32) -> Self {
        Self::new(id, secs.to_string())
    }
}

/// Premium-accelerator integration slot.
///
/// Always rendered as `<enabled_key>=false` and `<credential_key>=""`. The
/// user fills credentials in from the addon's own settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumToggle {
    pub enabled_key: String,
    pub credential_key: String,
}

impl PremiumToggle {
    pub fn new(enabled_key: impl Into<String>, credential_key: impl Into<String>) -> Self {
        Self {
            enabled_key: enabled_key.into(),
            credential_key: credential_key.into(),
        }
    }

    /// Uses `<prefix>.enabled` and `<prefix>.token`.
    pub fn prefixed(prefix: &str) -> Self {
        Self::new(format!("{prefix}.enabled"), format!("{prefix}.token"))
    }
}

/// Settings for one addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonSettings {
    /// Addon identifier, also the `addon_data` directory name.
    pub id: String,
    #[serde(default)]
    pub premium: Vec<PremiumToggle>,
    #[serde(default)]
    pub settings: Vec<Setting>,
}

impl AddonSettings {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            premium: Vec::new(),
            settings: Vec::new(),
        }
    }

    pub fn premium(mut self, toggle: PremiumToggle) -> Self {
        self.premium.push(toggle);
        self
    }

    pub fn setting(mut self, setting: Setting) -> Self {
        self.settings.push(setting);
        self
    }

    /// Renders the settings document.
    pub fn render(&self) -> String {
        let mut w = XmlWriter::new();
        w.open("settings", &[("version", SETTINGS_VERSION)]);

        for toggle in &self.premium {
            w.empty(
                "setting",
                &[("id", toggle.enabled_key.as_str()), ("value", "false")],
            );
            w.empty(
                "setting",
                &[("id", toggle.credential_key.as_str()), ("value", "")],
            );
        }

        for setting in &self.settings {
            w.empty(
                "setting",
                &[("id", setting.id.as_str()), ("value", setting.value.as_str())],
            );
        }

        w.close("settings");
        w.finish()
    }
}

// =============================================================================
// Built-in addons
// =============================================================================

pub const SEREN: &str = "plugin.video.seren";
pub const THE_CREW: &str = "plugin.video.thecrew";
pub const FEN: &str = "plugin.video.fen";
pub const VENOM: &str = "plugin.video.venom";
pub const THE_OATH: &str = "plugin.video.theoath";
pub const THE_LOOP: &str = "plugin.video.theloop";
pub const MAD_TITAN_SPORTS: &str = "plugin.video.madtitansports";
pub const TMDB_HELPER: &str = "plugin.video.themoviedb.helper";

/// The built-in addon table, in document order.
pub fn builtin() -> Vec<AddonSettings> {
    vec![
        seren(),
        the_crew(),
        fen(),
        venom(),
        the_oath(),
        the_loop(),
        mad_titan_sports(),
        tmdb_helper(),
    ]
}

fn seren() -> AddonSettings {
    AddonSettings::new(SEREN)
        .premium(PremiumToggle::new("rd.enabled", "rd.auth"))
        .premium(PremiumToggle::new("premiumize.enabled", "premiumize.token"))
        .premium(PremiumToggle::new("alldebrid.enabled", "alldebrid.apikey"))
        .setting(Setting::seconds("general.timeout", 45))
        .setting(Setting::new("general.source_select", "1"))
        .setting(Setting::flag("scraping.timeout_adaptive", true))
        .setting(Setting::flag("interface.trakt.enabled", false))
        .setting(Setting::flag("interface.fanart.enabled", true))
        .setting(Setting::seconds("provider.timeout", 30))
        .setting(Setting::flag("provider.packageDisable", false))
}

fn the_crew() -> AddonSettings {
    AddonSettings::new(THE_CREW)
        .premium(PremiumToggle::prefixed("realdebrid"))
        .premium(PremiumToggle::prefixed("alldebrid"))
        .premium(PremiumToggle::prefixed("premiumize"))
        .setting(Setting::seconds("timeout.sources", 30))
        .setting(Setting::seconds("timeout.resolve", 15))
        .setting(Setting::flag("quality.1080p", true))
        .setting(Setting::flag("quality.4k", false))
        .setting(Setting::flag("trakt.enabled", false))
        .setting(Setting::flag("fanart.enabled", true))
}

fn fen() -> AddonSettings {
    AddonSettings::new(FEN)
        .premium(PremiumToggle::new("rd.enabled", "rd.token"))
        .premium(PremiumToggle::new("pm.enabled", "pm.token"))
        .premium(PremiumToggle::new("ad.enabled", "ad.token"))
        .setting(Setting::seconds("results.timeout", 20))
        .setting(Setting::new("results.quality_movie", "1080p"))
        .setting(Setting::new("results.quality_episode", "1080p"))
        .setting(Setting::flag("provider.external", false))
        .setting(Setting::flag("trakt.enabled", false))
        .setting(Setting::flag("fanart.enabled", true))
        .setting(Setting::flag("autoplay", false))
}

fn venom() -> AddonSettings {
    AddonSettings::new(VENOM)
        .premium(PremiumToggle::new("realdebrid.enable", "realdebrid.token"))
        .premium(PremiumToggle::new("premiumize.enable", "premiumize.token"))
        .premium(PremiumToggle::new("alldebrid.enable", "alldebrid.token"))
        .setting(Setting::seconds("scrapers.timeout.1", 30))
        .setting(Setting::new("hosts.quality", "1"))
        .setting(Setting::flag("trakt.scrobble", false))
        .setting(Setting::flag("fanart.tv.enabled", true))
        .setting(Setting::flag("autoplay.enabled", false))
}

fn the_oath() -> AddonSettings {
    AddonSettings::new(THE_OATH)
        .premium(PremiumToggle::new("realdebrid.enable", "realdebrid.token"))
        .premium(PremiumToggle::new("premiumize.enable", "premiumize.token"))
        .premium(PremiumToggle::new("alldebrid.enable", "alldebrid.token"))
        .setting(Setting::seconds("scrapers.timeout.1", 30))
        .setting(Setting::new("hosts.quality", "1"))
        .setting(Setting::flag("trakt.scrobble", false))
        .setting(Setting::flag("fanart.enabled", true))
}

fn the_loop() -> AddonSettings {
    AddonSettings::new(THE_LOOP)
        .premium(PremiumToggle::prefixed("realdebrid"))
        .premium(PremiumToggle::prefixed("alldebrid"))
        .premium(PremiumToggle::prefixed("premiumize"))
        .setting(Setting::seconds("stream.timeout", 30))
        .setting(Setting::flag("stream.quality.prefer_hd", true))
        .setting(Setting::new("stream.quality.max_resolution", "1080p"))
        .setting(Setting::flag("sports.nfl.enabled", true))
        .setting(Setting::flag("sports.nba.enabled", true))
        .setting(Setting::flag("sports.soccer.enabled", true))
        .setting(Setting::flag("sports.mlb.enabled", true))
        .setting(Setting::flag("sports.nhl.enabled", true))
        .setting(Setting::flag("interface.fanart.enabled", true))
        .setting(Setting::flag("interface.autoplay", false))
}

fn mad_titan_sports() -> AddonSettings {
    AddonSettings::new(MAD_TITAN_SPORTS)
        .premium(PremiumToggle::new("rd.enabled", "rd.token"))
        .premium(PremiumToggle::new("ad.enabled", "ad.token"))
        .premium(PremiumToggle::new("pm.enabled", "pm.token"))
        .setting(Setting::seconds("timeout.streams", 25))
        .setting(Setting::new("quality.filter", "720p,1080p"))
        .setting(Setting::flag("autoplay.enabled", false))
        .setting(Setting::flag("show.american_football", true))
        .setting(Setting::flag("show.basketball", true))
        .setting(Setting::flag("show.baseball", true))
        .setting(Setting::flag("show.hockey", true))
        .setting(Setting::flag("show.soccer", true))
        .setting(Setting::flag("show.mma", true))
        .setting(Setting::flag("show.boxing", true))
        .setting(Setting::flag("region.us_sports", true))
        .setting(Setting::flag("region.international", true))
}

fn tmdb_helper() -> AddonSettings {
    AddonSettings::new(TMDB_HELPER)
        .premium(PremiumToggle::new("mdblist.enabled", "mdblist.apikey"))
        .setting(Setting::seconds("timeout", 15))
        .setting(Setting::flag("trakt.enabled", false))
        .setting(Setting::new("language", "en"))
        .setting(Setting::flag("fanarttv_lookup", true))
        .setting(Setting::flag("widgets.autoplay", false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premium_rendered_disabled_and_empty() {
        let doc = AddonSettings::new("plugin.video.test")
            .premium(PremiumToggle::prefixed("realdebrid"))
            .setting(Setting::seconds("timeout", 30))
            .render();

        assert!(doc.contains(r#"<setting id="realdebrid.enabled" value="false" />"#));
        assert!(doc.contains(r#"<setting id="realdebrid.token" value="" />"#));
        assert!(doc.contains(r#"<setting id="timeout" value="30" />"#));
        assert!(doc.contains(r#"<settings version="2">"#));
    }

    #[test]
    fn test_builtin_ids_unique() {
        let addons = builtin();
        let mut ids: Vec<_> = addons.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), addons.len());
    }
}
