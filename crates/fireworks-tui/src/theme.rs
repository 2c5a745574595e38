use crossterm::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Status bar text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
    /// Winner banner color
    pub success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Night sky
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb { r: 8, g: 12, b: 20 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
        }
    }
}

/// Terminal color for a particle
pub fn particle_color(color: fireworks_core::Color) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Glyph for a particle, shrinking as it fades
pub fn particle_glyph(opacity: f64) -> char {
    if opacity > 0.66 {
        '●'
    } else if opacity > 0.33 {
        '•'
    } else {
        '·'
    }
}
