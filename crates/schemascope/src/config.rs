//! Configuration types for graph construction and link layout.
//!
//! All types implement [`serde::Deserialize`] with per-field defaults, so a
//! host application can ship a partial TOML file and inherit the rest.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining schema and link settings.
//! - [`SchemaConfig`] - Limits applied while building the graph.
//! - [`LinkConfig`] - Geometry constants for connector curves.
//!
//! # Example
//!
//! ```
//! # use schemascope::config::AppConfig;
//! let config = AppConfig::from_toml_str("[links]\nloop_size = 24.0\n").unwrap();
//! assert_eq!(config.links().loop_size(), 24.0);
//! assert_eq!(config.schema().max_hierarchy_depth(), 64);
//! ```

use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level configuration combining schema and link settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Graph construction section.
    #[serde(default)]
    schema: SchemaConfig,

    /// Link layout section.
    #[serde(default)]
    links: LinkConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(schema: SchemaConfig, links: LinkConfig) -> Self {
        Self { schema, links }
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for TOML syntax or type errors and
    /// [`ConfigError::InvalidValue`] for values outside their allowed range.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the schema configuration.
    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    /// Returns the link layout configuration.
    pub fn links(&self) -> &LinkConfig {
        &self.links
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.schema.validate()?;
        self.links.validate()
    }
}

/// Limits applied while building the schema graph.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Maximum number of ancestors a class may have.
    max_hierarchy_depth: usize,
}

impl SchemaConfig {
    pub fn new(max_hierarchy_depth: usize) -> Self {
        Self {
            max_hierarchy_depth,
        }
    }

    /// Returns the maximum number of ancestors a class may have.
    pub fn max_hierarchy_depth(&self) -> usize {
        self.max_hierarchy_depth
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hierarchy_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "schema.max_hierarchy_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_hierarchy_depth: 64,
        }
    }
}

/// Geometry constants for connector curves, in screen pixels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Distance between anchors that would otherwise coincide on one box edge.
    anchor_spacing: f32,
    /// Fraction of the horizontal gap used as control-point reach for cross-panel curves.
    curve_tension: f32,
    /// Smallest outward bulge of a same-panel curve.
    bulge_min: f32,
    /// Bulge growth per pixel of vertical distance between same-panel endpoints.
    bulge_factor: f32,
    /// Largest outward bulge of a same-panel curve.
    bulge_max: f32,
    /// Reach of a self-loop beyond its anchor corner.
    loop_size: f32,
    /// Distance of self-loop anchors from the corner they wrap.
    loop_inset: f32,
}

impl LinkConfig {
    pub fn anchor_spacing(&self) -> f32 {
        self.anchor_spacing
    }

    pub fn curve_tension(&self) -> f32 {
        self.curve_tension
    }

    pub fn bulge_min(&self) -> f32 {
        self.bulge_min
    }

    pub fn bulge_factor(&self) -> f32 {
        self.bulge_factor
    }

    pub fn bulge_max(&self) -> f32 {
        self.bulge_max
    }

    pub fn loop_size(&self) -> f32 {
        self.loop_size
    }

    pub fn loop_inset(&self) -> f32 {
        self.loop_inset
    }

    /// Sets the anchor spacing (builder style).
    pub fn with_anchor_spacing(mut self, spacing: f32) -> Self {
        self.anchor_spacing = spacing;
        self
    }

    /// Sets the self-loop reach (builder style).
    pub fn with_loop_size(mut self, size: f32) -> Self {
        self.loop_size = size;
        self
    }

    /// Returns the outward bulge for a same-panel curve spanning `vertical_span` pixels.
    pub fn bulge_for_span(&self, vertical_span: f32) -> f32 {
        (self.bulge_min + vertical_span.abs() * self.bulge_factor).min(self.bulge_max)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("links.anchor_spacing", self.anchor_spacing),
            ("links.bulge_min", self.bulge_min),
            ("links.bulge_max", self.bulge_max),
            ("links.loop_size", self.loop_size),
        ];
        for (key, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        if self.curve_tension.is_nan() || self.curve_tension <= 0.0 || self.curve_tension > 1.0 {
            return Err(ConfigError::InvalidValue {
                key: "links.curve_tension",
                reason: format!("must be in (0, 1], got {}", self.curve_tension),
            });
        }
        if self.bulge_factor.is_nan() || self.bulge_factor < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "links.bulge_factor",
                reason: format!("must not be negative, got {}", self.bulge_factor),
            });
        }
        if self.loop_inset.is_nan() || self.loop_inset < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "links.loop_inset",
                reason: format!("must not be negative, got {}", self.loop_inset),
            });
        }
        if self.bulge_max < self.bulge_min {
            return Err(ConfigError::InvalidValue {
                key: "links.bulge_max",
                reason: format!(
                    "must not be smaller than links.bulge_min ({} < {})",
                    self.bulge_max, self.bulge_min
                ),
            });
        }
        Ok(())
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            anchor_spacing: 6.0,
            curve_tension: 0.5,
            bulge_min: 24.0,
            bulge_factor: 0.25,
            bulge_max: 120.0,
            loop_size: 18.0,
            loop_inset: 8.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.schema().max_hierarchy_depth(), 64);
        assert_approx_eq!(f32, config.links().anchor_spacing(), 6.0);
        assert_approx_eq!(f32, config.links().curve_tension(), 0.5);
        assert_approx_eq!(f32, config.links().loop_size(), 18.0);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.schema().max_hierarchy_depth(), 64);
        assert_approx_eq!(f32, config.links().bulge_max(), 120.0);
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [schema]
            max_hierarchy_depth = 8

            [links]
            anchor_spacing = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(config.schema().max_hierarchy_depth(), 8);
        assert_approx_eq!(f32, config.links().anchor_spacing(), 10.0);
        assert_approx_eq!(f32, config.links().bulge_min(), 24.0);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = AppConfig::from_toml_str("[schema]\nmax_hierarchy_depth = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "schema.max_hierarchy_depth",
                ..
            }
        ));

        let err = AppConfig::from_toml_str("[links]\ncurve_tension = 1.5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "links.curve_tension",
                ..
            }
        ));

        let err = AppConfig::from_toml_str("[links]\nbulge_min = 50.0\nbulge_max = 10.0\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "links.bulge_max",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_bad_syntax() {
        let err = AppConfig::from_toml_str("[links\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_bulge_for_span_is_capped() {
        let links = LinkConfig::default();
        assert_approx_eq!(f32, links.bulge_for_span(0.0), 24.0);
        assert_approx_eq!(f32, links.bulge_for_span(-40.0), 34.0);
        assert_approx_eq!(f32, links.bulge_for_span(10_000.0), 120.0);
    }
}
