//! Shortcut registry (`favourites.xml`).
//!
//! Shortcuts are grouped under label rows. A label row is itself a
//! favourite whose action is `noop`, with the label wrapped in a color tag.

use super::addons::{
    FEN, MAD_TITAN_SPORTS, SEREN, THE_CREW, THE_LOOP, THE_OATH, TMDB_HELPER, VENOM,
};
use super::xml::XmlWriter;
use serde::{Deserialize, Serialize};

/// Video window.
const VIDEO_WINDOW: u32 = 10025;

/// Addon browser window.
const ADDON_BROWSER_WINDOW: u32 = 10040;

const YOUTUBE: &str = "plugin.video.youtube";

/// A launchable shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourite {
    pub name: String,
    #[serde(default)]
    pub thumb: String,
    pub action: String,
}

impl Favourite {
    /// Opens an addon's root listing.
    pub fn addon(name: impl Into<String>, addon_id: &str) -> Self {
        Self::addon_path(name, addon_id, "")
    }

    /// Opens an addon at `query` (e.g. `?mode=sports`).
    pub fn addon_path(name: impl Into<String>, addon_id: &str, query: &str) -> Self {
        Self {
            name: name.into(),
            thumb: format!("special://home/addons/{addon_id}/icon.png"),
            action: format!(
                r#"ActivateWindow({VIDEO_WINDOW},"plugin://{addon_id}/{query}",return)"#
            ),
        }
    }

    /// Opens a window by id.
    pub fn window(name: impl Into<String>, window: u32) -> Self {
        Self {
            name: name.into(),
            thumb: String::new(),
            action: format!("ActivateWindow({window})"),
        }
    }

    /// Returns the addon id this shortcut launches, if any.
    pub fn addon_id(&self) -> Option<&str> {
        let rest = self.action.split_once("plugin://")?.1;
        rest.split(['/', '"']).next().filter(|id| !id.is_empty())
    }
}

/// A labelled group of shortcuts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavouriteGroup {
    pub label: String,
    /// Label color name understood by the skin.
    pub color: String,
    #[serde(default)]
    pub entries: Vec<Favourite>,
}

impl FavouriteGroup {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, favourite: Favourite) -> Self {
        self.entries.push(favourite);
        self
    }

    fn header_name(&self) -> String {
        format!("[COLOR {}]{}[/COLOR]", self.color, self.label)
    }
}

/// The built-in shortcut groups.
pub fn builtin() -> Vec<FavouriteGroup> {
    vec![
        FavouriteGroup::new("MOVIES & TV", "skyblue")
            .entry(Favourite::addon("Seren", SEREN))
            .entry(Favourite::addon("The Crew", THE_CREW))
            .entry(Favourite::addon("Fen", FEN))
            .entry(Favourite::addon("Venom", VENOM))
            .entry(Favourite::addon("The Oath", THE_OATH)),
        FavouriteGroup::new("SPORTS", "orange")
            .entry(Favourite::addon("The Loop", THE_LOOP))
            .entry(Favourite::addon("Mad Titan Sports", MAD_TITAN_SPORTS))
            .entry(Favourite::addon_path("The Crew Sports", THE_CREW, "?mode=sports")),
        FavouriteGroup::new("UTILITIES", "yellow")
            .entry(Favourite::addon("TMDb Helper", TMDB_HELPER))
            .entry(Favourite::addon("YouTube", YOUTUBE)),
        FavouriteGroup::new("SETUP", "red")
            .entry(Favourite::window("Debrid Setup", ADDON_BROWSER_WINDOW))
            .entry(Favourite::window("Add-on Settings", ADDON_BROWSER_WINDOW)),
    ]
}

/// Renders the registry.
pub fn render(groups: &[FavouriteGroup]) -> String {
    let mut w = XmlWriter::new();
    w.open("favourites", &[]);

    for group in groups {
        let header = group.header_name();
        w.element("favourite", &[("name", header.as_str()), ("thumb", "")], "noop");
        for fav in &group.entries {
            w.element(
                "favourite",
                &[("name", fav.name.as_str()), ("thumb", fav.thumb.as_str())],
                &fav.action,
            );
        }
    }

    w.close("favourites");
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addon_action() {
        let fav = Favourite::addon("Seren", SEREN);
        assert_eq!(
            fav.action,
            r#"ActivateWindow(10025,"plugin://plugin.video.seren/",return)"#
        );
        assert_eq!(fav.addon_id(), Some(SEREN));
    }

    #[test]
    fn test_window_has_no_addon() {
        assert_eq!(Favourite::window("Setup", 10040).addon_id(), None);
    }

    #[test]
    fn test_render_escapes_labels_and_actions() {
        let doc = render(&builtin());

        assert!(doc.contains(r#"name="[COLOR skyblue]MOVIES &amp; TV[/COLOR]""#));
        assert!(doc.contains("plugin://plugin.video.thecrew/?mode=sports"));
        assert!(doc.contains("ActivateWindow(10025,&quot;plugin://plugin.video.seren/&quot;,return)"));
        assert!(!doc.contains(" & "), "raw ampersand would make the document malformed");
    }
}
