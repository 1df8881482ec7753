use ratatui::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub title: Color,
    pub breadcrumbs: Color,
    pub dim: Color,
    pub completed: Color,
    pub search_match: Color,
    pub cursor: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Reset,
            text: Color::Reset,
            title: Color::Rgb(0xB0, 0xAA, 0xFF),
            breadcrumbs: Color::Rgb(0x7D, 0x78, 0xBF),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            completed: Color::Rgb(0x22, 0x8B, 0x22),
            search_match: Color::Rgb(0xFF, 0xD7, 0x00),
            cursor: Color::Rgb(0xFB, 0x41, 0x96),
        }
    }
}
