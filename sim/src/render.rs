//! Render descriptions attached to bodies.
//!
//! The core never draws anything; it only records what a renderer should
//! do with each body so the information survives serialization.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Reference to a sprite texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteRef {
    pub texture: String,
    pub x_scale: f64,
    pub y_scale: f64,
}

/// Fully resolved render description stored on a body.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderDescriptor {
    pub visible: bool,
    pub opacity: f64,
    pub fill_style: String,
    pub stroke_style: String,
    pub line_width: f64,
    pub sprite: Option<SpriteRef>,
}

impl RenderDescriptor {
    pub fn solid(fill_style: &str, stroke_style: &str) -> Self {
        Self {
            visible: true,
            opacity: 1.0,
            fill_style: fill_style.to_string(),
            stroke_style: stroke_style.to_string(),
            line_width: 1.0,
            sprite: None,
        }
    }
}

impl Default for RenderDescriptor {
    fn default() -> Self {
        Self::solid("#8c8c8c", "#5a5a5a")
    }
}

/// Per-field overrides; `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOverride {
    pub visible: Option<bool>,
    pub opacity: Option<f64>,
    pub fill_style: Option<String>,
    pub stroke_style: Option<String>,
    pub line_width: Option<f64>,
    pub sprite: Option<SpriteRef>,
}

impl From<RenderDescriptor> for RenderOverride {
    fn from(render: RenderDescriptor) -> Self {
        Self {
            visible: Some(render.visible),
            opacity: Some(render.opacity),
            fill_style: Some(render.fill_style),
            stroke_style: Some(render.stroke_style),
            line_width: Some(render.line_width),
            sprite: render.sprite,
        }
    }
}

/// Caller-supplied render hints.
///
/// `Enabled(false)` hides the body, `Enabled(true)` uses the defaults and
/// `Custom` overrides individual fields. In JSON this is either a boolean or
/// an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderOptions {
    Enabled(bool),
    Custom(RenderOverride),
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions::Enabled(true)
    }
}

impl From<bool> for RenderOptions {
    fn from(enabled: bool) -> Self {
        RenderOptions::Enabled(enabled)
    }
}

impl From<RenderOverride> for RenderOptions {
    fn from(custom: RenderOverride) -> Self {
        RenderOptions::Custom(custom)
    }
}

/// Resolve caller options against a shape's default description.
pub fn merge_render_options(
    default: &RenderDescriptor,
    options: &RenderOptions,
) -> RenderDescriptor {
    match options {
        RenderOptions::Enabled(true) => default.clone(),
        RenderOptions::Enabled(false) => RenderDescriptor {
            visible: false,
            ..default.clone()
        },
        RenderOptions::Custom(custom) => RenderDescriptor {
            visible: custom.visible.unwrap_or(default.visible),
            opacity: custom.opacity.unwrap_or(default.opacity),
            fill_style: custom
                .fill_style
                .clone()
                .unwrap_or_else(|| default.fill_style.clone()),
            stroke_style: custom
                .stroke_style
                .clone()
                .unwrap_or_else(|| default.stroke_style.clone()),
            line_width: custom.line_width.unwrap_or(default.line_width),
            sprite: custom.sprite.clone().or_else(|| default.sprite.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_uses_defaults() {
        let default = RenderDescriptor::solid("#fff", "#000");
        let merged = merge_render_options(&default, &RenderOptions::Enabled(true));
        assert_eq!(merged, default);
    }

    #[test]
    fn test_disabled_hides_body() {
        let default = RenderDescriptor::solid("#fff", "#000");
        let merged = merge_render_options(&default, &false.into());
        assert!(!merged.visible);
        assert_eq!(merged.fill_style, "#fff");
    }

    #[test]
    fn test_custom_overrides_fields() {
        let default = RenderDescriptor::solid("#fff", "#000");
        let custom = RenderOverride {
            opacity: Some(0.5),
            fill_style: Some("red".to_string()),
            ..Default::default()
        };
        let merged = merge_render_options(&default, &custom.into());
        assert!(merged.visible);
        assert_eq!(merged.opacity, 0.5);
        assert_eq!(merged.fill_style, "red");
        assert_eq!(merged.stroke_style, "#000");
        assert_eq!(merged.line_width, 1.0);
        assert!(merged.sprite.is_none());
    }

    #[test]
    fn test_full_override_roundtrip() {
        let mut stored = RenderDescriptor::solid("#123", "#456");
        stored.sprite = Some(SpriteRef {
            texture: "ship.png".to_string(),
            x_scale: 2.0,
            y_scale: 2.0,
        });
        let options: RenderOptions = RenderOverride::from(stored.clone()).into();
        let merged = merge_render_options(&RenderDescriptor::default(), &options);
        assert_eq!(merged, stored);
    }

    #[test]
    fn test_options_from_json() {
        let hidden: RenderOptions = serde_json::from_str("false").unwrap();
        assert_eq!(hidden, RenderOptions::Enabled(false));

        let custom: RenderOptions = serde_json::from_str(r##"{"fill_style": "#abc"}"##).unwrap();
        match custom {
            RenderOptions::Custom(o) => assert_eq!(o.fill_style.as_deref(), Some("#abc")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
