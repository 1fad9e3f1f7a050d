use std::path::Path;

use ratatui::style::{Color, Modifier, Style as RatStyle};
use serde::{Deserialize, Serialize};

use crate::app::AlertKind;
use crate::columns::Tone;

/// Color that can be serialized/deserialized
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeColor {
    /// Named color: "red", "blue", "cyan", etc.
    Named(NamedColor),
    /// RGB color: [255, 128, 0]
    Rgb([u8; 3]),
    /// 256-color index: 42
    Indexed(u8),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
    DarkGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightMagenta,
    LightCyan,
    White,
    Reset,
}

impl From<ThemeColor> for Color {
    fn from(tc: ThemeColor) -> Color {
        match tc {
            ThemeColor::Named(n) => match n {
                NamedColor::Black => Color::Black,
                NamedColor::Red => Color::Red,
                NamedColor::Green => Color::Green,
                NamedColor::Yellow => Color::Yellow,
                NamedColor::Blue => Color::Blue,
                NamedColor::Magenta => Color::Magenta,
                NamedColor::Cyan => Color::Cyan,
                NamedColor::Gray => Color::Gray,
                NamedColor::DarkGray => Color::DarkGray,
                NamedColor::LightRed => Color::LightRed,
                NamedColor::LightGreen => Color::LightGreen,
                NamedColor::LightYellow => Color::LightYellow,
                NamedColor::LightBlue => Color::LightBlue,
                NamedColor::LightMagenta => Color::LightMagenta,
                NamedColor::LightCyan => Color::LightCyan,
                NamedColor::White => Color::White,
                NamedColor::Reset => Color::Reset,
            },
            ThemeColor::Rgb([r, g, b]) => Color::Rgb(r, g, b),
            ThemeColor::Indexed(i) => Color::Indexed(i),
        }
    }
}

/// Style definition for a single element
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<ThemeColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<ThemeColor>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub dim: bool,
}

impl ElementStyle {
    pub fn fg(color: ThemeColor) -> Self {
        Self { fg: Some(color), ..Default::default() }
    }

    pub fn with_bg(mut self, color: ThemeColor) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub fn to_ratatui(&self) -> RatStyle {
        let mut style = RatStyle::default();
        if let Some(fg) = self.fg {
            style = style.fg(fg.into());
        }
        if let Some(bg) = self.bg {
            style = style.bg(bg.into());
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        style
    }
}

/// Badge colors, one per tone
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToneStyles {
    pub primary: ElementStyle,
    pub info: ElementStyle,
    pub success: ElementStyle,
    pub warning: ElementStyle,
    pub danger: ElementStyle,
    pub secondary: ElementStyle,
}

impl ToneStyles {
    fn get(&self, tone: Tone) -> &ElementStyle {
        match tone {
            Tone::Primary => &self.primary,
            Tone::Info => &self.info,
            Tone::Success => &self.success,
            Tone::Warning => &self.warning,
            Tone::Danger => &self.danger,
            Tone::Secondary => &self.secondary,
        }
    }
}

/// Complete theme configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    #[serde(default)]
    pub background: Option<ThemeColor>,

    // Table
    pub header: ElementStyle,
    pub header_sorted: ElementStyle,
    pub cell: ElementStyle,
    pub row_cursor: ElementStyle,
    pub border: ElementStyle,

    // Chrome
    pub tab: ElementStyle,
    pub tab_active: ElementStyle,
    pub stat_label: ElementStyle,
    pub search: ElementStyle,
    pub search_active: ElementStyle,
    pub pagination: ElementStyle,
    pub help: ElementStyle,

    // Alerts
    pub alert_success: ElementStyle,
    pub alert_error: ElementStyle,

    pub tones: ToneStyles,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    /// Dark theme with black background
    pub fn dark() -> Self {
        use NamedColor::*;
        let named = ThemeColor::Named;
        Self {
            name: "dark".to_string(),
            background: Some(named(Black)),
            header: ElementStyle::fg(named(LightGreen)).with_bold(),
            header_sorted: ElementStyle::fg(named(LightYellow)).with_bold(),
            cell: ElementStyle::fg(named(White)),
            row_cursor: ElementStyle::fg(named(Black)).with_bg(named(LightCyan)),
            border: ElementStyle::fg(named(DarkGray)),
            tab: ElementStyle::fg(named(Gray)),
            tab_active: ElementStyle::fg(named(Black)).with_bg(named(LightBlue)).with_bold(),
            stat_label: ElementStyle::fg(named(Gray)),
            search: ElementStyle::fg(named(Gray)),
            search_active: ElementStyle::fg(named(LightYellow)).with_bold(),
            pagination: ElementStyle::fg(named(LightCyan)),
            help: ElementStyle::fg(named(DarkGray)),
            alert_success: ElementStyle::fg(named(LightGreen)).with_bold(),
            alert_error: ElementStyle::fg(named(LightRed)).with_bold(),
            tones: ToneStyles {
                primary: ElementStyle::fg(named(LightBlue)).with_bold(),
                info: ElementStyle::fg(named(LightCyan)).with_bold(),
                success: ElementStyle::fg(named(LightGreen)).with_bold(),
                warning: ElementStyle::fg(named(LightYellow)).with_bold(),
                danger: ElementStyle::fg(named(LightRed)).with_bold(),
                secondary: ElementStyle::fg(named(Gray)),
            },
        }
    }

    /// Light theme (default)
    pub fn light() -> Self {
        use NamedColor::*;
        let named = ThemeColor::Named;
        Self {
            name: "light".to_string(),
            background: None, // Use terminal default
            header: ElementStyle::fg(named(Blue)).with_bold(),
            header_sorted: ElementStyle::fg(named(Magenta)).with_bold(),
            cell: ElementStyle::fg(named(Black)),
            row_cursor: ElementStyle::fg(named(White)).with_bg(named(Blue)),
            border: ElementStyle::fg(named(Gray)),
            tab: ElementStyle::fg(named(DarkGray)),
            tab_active: ElementStyle::fg(named(White)).with_bg(named(Blue)).with_bold(),
            stat_label: ElementStyle::fg(named(DarkGray)),
            search: ElementStyle::fg(named(DarkGray)),
            search_active: ElementStyle::fg(named(Black)).with_bold(),
            pagination: ElementStyle::fg(named(Blue)),
            help: ElementStyle::fg(named(Gray)).with_dim(),
            alert_success: ElementStyle::fg(named(Green)).with_bold(),
            alert_error: ElementStyle::fg(named(Red)).with_bold(),
            tones: ToneStyles {
                primary: ElementStyle::fg(named(Blue)).with_bold(),
                info: ElementStyle::fg(named(Cyan)).with_bold(),
                success: ElementStyle::fg(named(Green)).with_bold(),
                warning: ElementStyle::fg(named(Yellow)).with_bold(),
                danger: ElementStyle::fg(named(Red)).with_bold(),
                secondary: ElementStyle::fg(named(DarkGray)),
            },
        }
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// Load a theme from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read theme file: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse theme file: {}", e))
    }

    /// A built-in theme name, or else a path to a `.toml` theme file
    pub fn resolve(name: &str) -> Result<Self, String> {
        if let Some(theme) = Self::by_name(name) {
            return Ok(theme);
        }
        let path = Path::new(name);
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml")) {
            Self::from_file(path)
        } else {
            Err(format!("Unknown theme: {}", name))
        }
    }
}

/// Runtime style manager
pub struct Style {
    pub theme: Theme,
}

impl Style {
    pub fn with_theme(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn header(&self, sorted: bool) -> RatStyle {
        if sorted {
            self.theme.header_sorted.to_ratatui()
        } else {
            self.theme.header.to_ratatui()
        }
    }

    pub fn cell(&self) -> RatStyle {
        self.theme.cell.to_ratatui()
    }

    pub fn row_cursor(&self) -> RatStyle {
        self.theme.row_cursor.to_ratatui()
    }

    pub fn border(&self) -> RatStyle {
        self.theme.border.to_ratatui()
    }

    pub fn tab(&self, active: bool) -> RatStyle {
        if active {
            self.theme.tab_active.to_ratatui()
        } else {
            self.theme.tab.to_ratatui()
        }
    }

    pub fn stat_label(&self) -> RatStyle {
        self.theme.stat_label.to_ratatui()
    }

    pub fn search(&self, active: bool) -> RatStyle {
        if active {
            self.theme.search_active.to_ratatui()
        } else {
            self.theme.search.to_ratatui()
        }
    }

    pub fn pagination(&self) -> RatStyle {
        self.theme.pagination.to_ratatui()
    }

    pub fn help(&self) -> RatStyle {
        self.theme.help.to_ratatui()
    }

    pub fn alert(&self, kind: AlertKind) -> RatStyle {
        match kind {
            AlertKind::Success => self.theme.alert_success.to_ratatui(),
            AlertKind::Error => self.theme.alert_error.to_ratatui(),
        }
    }

    pub fn tone(&self, tone: Tone) -> RatStyle {
        self.theme.tones.get(tone).to_ratatui()
    }

    pub fn background(&self) -> Option<Color> {
        self.theme.background.map(|c| c.into())
    }
}
