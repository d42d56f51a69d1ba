//! Chart theming
//!
//! Palette lookups the binders use to colour labels, titles and tooltip
//! entries. Hosts with their own theme system implement [`ThemeProvider`].

use crate::model::Color;
use serde::{Deserialize, Serialize};

/// Colour lookups consumed by the binders
pub trait ThemeProvider {
    /// Palette colour for a series index (cycles through the palette)
    fn palette_color(&self, index: usize) -> Color;

    /// Position of a legend entry, used to pick its palette colour
    fn legend_color_index(&self, legend_name: &str) -> Option<usize>;

    /// Default text colour
    fn text_color(&self) -> Color;

    /// Colour of a legend entry; falls back to the text colour when unknown
    fn legend_color(&self, legend_name: &str) -> Color {
        self.legend_color_index(legend_name)
            .map(|index| self.palette_color(index))
            .unwrap_or_else(|| self.text_color())
    }

    /// True for the "unset" colour sentinel
    fn is_clear(&self, color: Color) -> bool {
        color.is_clear()
    }
}

/// Predefined palettes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorScheme {
    /// Office-like default colors
    #[default]
    Office,
    /// Pastel colors
    Pastel,
}

impl ColorScheme {
    /// Get the colors for this scheme
    pub fn colors(&self) -> Vec<Color> {
        match self {
            ColorScheme::Office => vec![
                Color::rgb(79, 129, 189),   // Blue
                Color::rgb(192, 80, 77),    // Red
                Color::rgb(155, 187, 89),   // Green
                Color::rgb(128, 100, 162),  // Purple
                Color::rgb(75, 172, 198),   // Teal
                Color::rgb(247, 150, 70),   // Orange
                Color::rgb(119, 146, 60),   // Olive
                Color::rgb(166, 166, 166),  // Gray
            ],
            ColorScheme::Pastel => vec![
                Color::rgb(174, 198, 207),
                Color::rgb(255, 179, 186),
                Color::rgb(255, 223, 186),
                Color::rgb(255, 255, 186),
                Color::rgb(186, 255, 201),
                Color::rgb(186, 225, 255),
                Color::rgb(218, 186, 255),
                Color::rgb(255, 186, 255),
            ],
        }
    }
}

/// A palette plus the legend order used to resolve legend colours
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Theme {
    pub palette: Vec<Color>,
    pub text_color: Color,
    /// Legend entries in display order
    #[serde(default)]
    pub legend_names: Vec<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_scheme(ColorScheme::Office)
    }
}

impl Theme {
    /// Build a theme from a predefined palette
    pub fn from_scheme(scheme: ColorScheme) -> Self {
        Self {
            palette: scheme.colors(),
            text_color: Color::rgb(51, 51, 51),
            legend_names: Vec::new(),
        }
    }

    /// Register a legend entry if it is not known yet
    pub fn register_legend(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.legend_names.contains(&name) {
            self.legend_names.push(name);
        }
    }
}

impl ThemeProvider for Theme {
    fn palette_color(&self, index: usize) -> Color {
        if self.palette.is_empty() {
            return self.text_color;
        }
        self.palette[index % self.palette.len()]
    }

    fn legend_color_index(&self, legend_name: &str) -> Option<usize> {
        self.legend_names.iter().position(|n| n == legend_name)
    }

    fn text_color(&self) -> Color {
        self.text_color
    }
}
