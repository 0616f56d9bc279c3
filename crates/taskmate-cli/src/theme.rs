use ratatui::style::Color;
use taskmate_core::storage::StateStore;
use tracing::warn;

/// Storage key holding the theme preference string.
pub const THEME_KEY: &str = "taskmate_theme";

/// TUI color scheme, persisted as a `"dark"`/`"light"` string next to the
/// task data. Defaults to dark when absent or unreadable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn load<S: StateStore>(store: &S) -> Self {
        match store.get(THEME_KEY) {
            Ok(bytes) if bytes == b"light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn save<S: StateStore>(self, store: &S) {
        // Preference writes are best-effort.
        if let Err(err) = store.put(THEME_KEY, self.label().as_bytes()) {
            warn!("failed to persist theme preference: {err}");
        }
    }

    pub fn fg(self) -> Color {
        match self {
            Theme::Dark => Color::White,
            Theme::Light => Color::Black,
        }
    }

    pub fn dim(self) -> Color {
        match self {
            Theme::Dark => Color::DarkGray,
            Theme::Light => Color::Gray,
        }
    }

    pub fn accent(self) -> Color {
        match self {
            Theme::Dark => Color::Cyan,
            Theme::Light => Color::Blue,
        }
    }
}
