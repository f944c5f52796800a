// ── Colour themes & fonts ─────────────────────────────────────────────────────
//
// Resolves the active palette and font family from `Settings`.  Views opt in
// through `Themeable`; the document lifecycle only ever sees the trait, never
// a concrete widget type.
//
// Colour conventions:
//   • All palette entries are `#rrggbb` strings, as stored in settings.

use crate::settings::{Settings, MORE_FONTS};

/// Background, foreground and caret colours for the text surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Palette<'a> {
    pub(crate) bg: &'a str,
    pub(crate) fg: &'a str,
    pub(crate) insert: &'a str,
}

const fn palette(bg: &'static str, fg: &'static str, insert: &'static str) -> Palette<'static> {
    Palette { bg, fg, insert }
}

/// Built-in themes, in the order a settings form lists them.
pub(crate) const THEMES: &[(&str, Palette<'static>)] = &[
    ("dark", palette("#1e1e1e", "#d4d4d4", "#ffffff")),
    ("paper", palette("#f5f5f5", "#222222", "#222222")),
    ("sepia", palette("#f5e6c4", "#5b4636", "#5b4636")),
    ("nord", palette("#2e3440", "#d8dee9", "#d8dee9")),
    ("gruvbox_light", palette("#fbf1c7", "#3c3836", "#3c3836")),
    ("gruvbox_dark", palette("#282828", "#ebdbb2", "#ebdbb2")),
    ("monokai", palette("#272822", "#f8f8f2", "#f8f8f2")),
    ("cobalt", palette("#002240", "#ffffff", "#ffffff")),
];

/// Theme name that takes its colours from `custom_bg` / `custom_fg`.
pub(crate) const CUSTOM: &str = "custom";

/// Fallback for unknown theme names.
const NORD: Palette<'static> = palette("#2e3440", "#d8dee9", "#d8dee9");

/// Font families offered directly; the last entry defers to the full list.
pub(crate) const BASIC_FONT_FAMILIES: &[&str] = &[
    "Arial",
    "Calibri",
    "Cambria",
    "Century",
    "Comic Sans",
    "Consolas",
    "Courier New",
    "Serif",
    "Times New Roman",
    "Verdana",
    MORE_FONTS,
];

/// Palette for the configured theme.
pub(crate) fn palette_for(settings: &Settings) -> Palette<'_> {
    if settings.theme == CUSTOM {
        return Palette {
            bg: &settings.custom_bg,
            fg: &settings.custom_fg,
            insert: &settings.custom_fg,
        };
    }
    THEMES
        .iter()
        .find(|(name, _)| *name == settings.theme)
        .map(|(_, p)| *p)
        .unwrap_or(NORD)
}

/// Font family to render with.
///
/// "More Fonts..." resolves to `full_font_family`, or to the first basic
/// family when that is empty.
pub(crate) fn font_family(settings: &Settings) -> &str {
    if settings.font_family == MORE_FONTS {
        if settings.full_font_family.is_empty() {
            return BASIC_FONT_FAMILIES[0];
        }
        return &settings.full_font_family;
    }
    &settings.font_family
}

// ── Capability ────────────────────────────────────────────────────────────────

/// A presentation view that re-styles itself when settings change.
pub(crate) trait Themeable {
    fn apply_theme(&mut self, palette: &Palette<'_>, settings: &Settings);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
