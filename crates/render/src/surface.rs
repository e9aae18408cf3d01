use scenekit_common::Color;
use serde::{Deserialize, Serialize};

/// Output size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. Zero heights are treated as one pixel.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Rasterization path picked at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// GPU-accelerated adapter.
    Hardware,
    /// CPU fallback adapter.
    Software,
}

impl Backend {
    /// Prefer hardware when the platform reports it.
    pub fn select(hardware_available: bool) -> Self {
        let backend = if hardware_available {
            Self::Hardware
        } else {
            Self::Software
        };
        tracing::info!(?backend, "render backend selected");
        backend
    }

    /// Whether to ask the platform for its fallback (software) adapter.
    pub fn force_fallback(self) -> bool {
        matches!(self, Self::Software)
    }
}

/// Configuration of the render surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub viewport: Viewport,
    pub clear_color: Color,
    pub clear_alpha: f32,
    pub shadows: bool,
}

impl RenderSettings {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            clear_color: Color(0xeeeeee),
            clear_alpha: 1.0,
            shadows: true,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_prefers_hardware() {
        assert_eq!(Backend::select(true), Backend::Hardware);
        assert_eq!(Backend::select(false), Backend::Software);
        assert!(Backend::Software.force_fallback());
        assert!(!Backend::Hardware.force_fallback());
    }

    #[test]
    fn settings_defaults() {
        let settings = RenderSettings::new(Viewport::new(800, 600));
        assert_eq!(settings.clear_color, Color(0xeeeeee));
        assert_eq!(settings.clear_alpha, 1.0);
        assert!(settings.shadows);
        assert_eq!(settings.viewport.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn zero_height_aspect_is_finite() {
        assert!(Viewport::new(100, 0).aspect().is_finite());
    }
}
