use scenekit_common::Color;
use serde::{Deserialize, Serialize};

/// Light source. Directional and spot lights take their position from the
/// owning node's transform and aim at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Ambient {
        color: Color,
    },
    Directional {
        color: Color,
        intensity: f32,
        cast_shadow: bool,
    },
    Spot {
        color: Color,
        intensity: f32,
        cast_shadow: bool,
    },
}

impl Light {
    pub fn ambient(color: Color) -> Self {
        Self::Ambient { color }
    }

    pub fn directional(color: Color) -> Self {
        Self::Directional {
            color,
            intensity: 1.0,
            cast_shadow: false,
        }
    }

    pub fn spot(color: Color) -> Self {
        Self::Spot {
            color,
            intensity: 1.0,
            cast_shadow: false,
        }
    }

    /// Enable shadow casting. Ambient light has no direction and ignores this.
    pub fn casting_shadow(mut self) -> Self {
        match &mut self {
            Self::Directional { cast_shadow, .. } | Self::Spot { cast_shadow, .. } => {
                *cast_shadow = true;
            }
            Self::Ambient { .. } => {}
        }
        self
    }

    pub fn color(&self) -> Color {
        match *self {
            Self::Ambient { color }
            | Self::Directional { color, .. }
            | Self::Spot { color, .. } => color,
        }
    }

    pub fn casts_shadow(&self) -> bool {
        match *self {
            Self::Ambient { .. } => false,
            Self::Directional { cast_shadow, .. } | Self::Spot { cast_shadow, .. } => cast_shadow,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Ambient { .. } => "ambient",
            Self::Directional { .. } => "directional",
            Self::Spot { .. } => "spot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_never_casts_shadow() {
        let light = Light::ambient(Color(0x0c0c0c)).casting_shadow();
        assert!(!light.casts_shadow());
    }

    #[test]
    fn spot_casting_shadow() {
        let light = Light::spot(Color::WHITE).casting_shadow();
        assert!(light.casts_shadow());
        assert_eq!(light.color(), Color::WHITE);
        assert_eq!(light.kind_name(), "spot");
    }
}
