use serde::{Deserialize, Serialize};

/// 24-bit RGB colour, stored as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Self = Self(0xffffff);

    /// Build a colour from the low 24 bits of `hex`.
    pub fn from_hex(hex: u32) -> Self {
        Self(hex & 0xffffff)
    }

    pub fn hex(self) -> u32 {
        self.0
    }

    /// Channels in 0..=1.
    pub fn rgb(self) -> [f32; 3] {
        let r = (self.0 >> 16) & 0xff;
        let g = (self.0 >> 8) & 0xff;
        let b = self.0 & 0xff;
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
    }

    pub fn rgba(self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.rgb();
        [r, g, b, alpha]
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels() {
        assert_eq!(Color(0xff0000).rgb(), [1.0, 0.0, 0.0]);
        assert_eq!(Color::WHITE.rgba(0.5), [1.0, 1.0, 1.0, 0.5]);
    }

    #[test]
    fn from_hex_masks_high_bits() {
        assert_eq!(Color::from_hex(0xff12_3456), Color(0x123456));
    }

    #[test]
    fn display_is_css_hex() {
        assert_eq!(Color(0x7777ff).to_string(), "#7777ff");
        assert_eq!(Color(0x0c0c0c).to_string(), "#0c0c0c");
    }
}
