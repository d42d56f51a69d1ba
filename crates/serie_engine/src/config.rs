//! Engine configuration
//!
//! Tunables shared by every binder. Loaded from JSON the same way the rest of
//! the chart configuration is; missing fields fall back to their defaults.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Configuration for a [`SerieUpdateEngine`](crate::SerieUpdateEngine)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Icon size used when a point has no icon style
    pub default_icon_size: (f64, f64),
    /// Maximum number of live labels per series (None = unbounded)
    pub pool_capacity: Option<usize>,
    /// Prefix for pooled label object names
    pub label_object_prefix: String,
    /// Prefix for the per-series root object name
    pub root_object_prefix: String,
    /// Font size of the series title
    pub title_font_size: f64,
    /// Width of the series title box
    pub title_width: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_icon_size: (20.0, 20.0),
            pool_capacity: None,
            label_object_prefix: "label".to_string(),
            root_object_prefix: "serie".to_string(),
            title_font_size: 10.0,
            title_width: 50.0,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON and validate it
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty JSON
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the pool capacity
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = Some(capacity);
        self
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> EngineResult<()> {
        if self.label_object_prefix.is_empty() {
            return Err(EngineError::Config(
                "label_object_prefix must not be empty".to_string(),
            ));
        }
        if self.root_object_prefix.is_empty() {
            return Err(EngineError::Config(
                "root_object_prefix must not be empty".to_string(),
            ));
        }
        if self.default_icon_size.0 < 0.0 || self.default_icon_size.1 < 0.0 {
            return Err(EngineError::Config(
                "default_icon_size must not be negative".to_string(),
            ));
        }
        if self.title_font_size <= 0.0 {
            return Err(EngineError::Config(
                "title_font_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
