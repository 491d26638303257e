use ratatui::style::Color;
use subtrack_core::motion::NEUTRAL_COLOR;
use subtrack_core::stats::BAR_FALLBACK_COLOR;

/// Runtime palette
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub fg1: Color,
    pub grey0: Color,
    pub grey1: Color,

    // Semantic colors
    pub selection: Color,
    pub disabled: Color,
    pub error: Color,
    pub success: Color,
    pub accent: Color,

    // Action rail
    pub edit: Color,
    pub mv: Color,
    pub disable: Color,
    pub delete: Color,

    // Charts
    pub neutral: Color,
    pub bar_fallback: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg0: Color::Rgb(0x1c, 0x1c, 0x1e),
            bg1: Color::Rgb(0x2c, 0x2c, 0x2e),
            bg2: Color::Rgb(0x3a, 0x3a, 0x3c),
            fg0: Color::Rgb(0xf2, 0xf2, 0xf7),
            fg1: Color::Rgb(0xd1, 0xd1, 0xd6),
            grey0: Color::Rgb(0x63, 0x63, 0x66),
            grey1: Color::Rgb(0x8e, 0x8e, 0x93),
            selection: Color::Rgb(0x3a, 0x3a, 0x3c),
            disabled: Color::Rgb(0x63, 0x63, 0x66),
            error: Color::Rgb(0xff, 0x45, 0x3a),
            success: Color::Rgb(0x30, 0xd1, 0x58),
            accent: Color::Rgb(0x0a, 0x84, 0xff),
            edit: Color::Rgb(0x0a, 0x84, 0xff),
            mv: Color::Rgb(0x8e, 0x8e, 0x93),
            disable: Color::Rgb(0xff, 0x9f, 0x0a),
            delete: Color::Rgb(0xff, 0x45, 0x3a),
            neutral: parse_hex_color(NEUTRAL_COLOR).unwrap_or(Color::Gray),
            bar_fallback: parse_hex_color(BAR_FALLBACK_COLOR).unwrap_or(Color::DarkGray),
        }
    }
}

impl Theme {
    /// Colour for a category/subscription, falling back to the bar grey
    pub fn chart_color(&self, hex: &str) -> Color {
        parse_hex_color(hex).unwrap_or(self.bar_fallback)
    }
}

/// Parse a hex color string into a ratatui Color
/// Accepts formats: "#RRGGBB", "RRGGBB", "#RGB", "RGB"
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }

    match hex.len() {
        // Short form: RGB -> RRGGBB
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}
