use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Page geometry in points, origin at the bottom-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub title_x: f32,
    pub title_y: f32,
    pub title_font_size: f32,
    pub body_x: f32,
    pub body_top: f32,
    pub body_font_size: f32,
    pub line_height: f32,
    pub bottom_margin: f32,
    /// Maximum characters per wrapped line.
    pub wrap_width: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        PageLayout {
            title_x: 200.0,
            title_y: 800.0,
            title_font_size: 16.0,
            body_x: 50.0,
            body_top: 780.0,
            body_font_size: 12.0,
            line_height: 20.0,
            bottom_margin: 50.0,
            wrap_width: 80,
        }
    }
}

impl PageLayout {
    /// Rejects geometry under which the cursor would not move down the page.
    pub fn validate(&self) -> Result<()> {
        let coordinates = [
            ("title_x", self.title_x),
            ("title_y", self.title_y),
            ("body_x", self.body_x),
            ("body_top", self.body_top),
            ("bottom_margin", self.bottom_margin),
        ];
        for (name, value) in coordinates {
            if !value.is_finite() {
                return Err(ReportError::InvalidLayout(format!("{name} is not finite")));
            }
        }

        let positive = [
            ("line_height", self.line_height),
            ("title_font_size", self.title_font_size),
            ("body_font_size", self.body_font_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReportError::InvalidLayout(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.wrap_width == 0 {
            return Err(ReportError::InvalidLayout(
                "wrap_width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Slopes with an absolute value at or below this count as stable.
    pub epsilon: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig { epsilon: 1e-9 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub layout: PageLayout,
    pub trend: TrendConfig,
}
