use serde::{Serialize, Serializer};
use std::fmt;

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const TEAL: Rgb = Rgb::new(0, 128, 128);
    pub const GREEN: Rgb = Rgb::new(0, 128, 0);
    pub const CHARTREUSE: Rgb = Rgb::new(127, 255, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const ORANGE: Rgb = Rgb::new(255, 165, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const DARK_RED: Rgb = Rgb::new(139, 0, 0);
    pub const GREY: Rgb = Rgb::new(128, 128, 128);
    pub const BRIGHT_GREEN: Rgb = Rgb::new(57, 255, 20);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise linear mix; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| -> u8 {
            let v = a as f64 + (b as f64 - a as f64) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::Rgb;

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert_eq!(Rgb::BLUE.lerp(Rgb::TEAL, 0.0), Rgb::BLUE);
        assert_eq!(Rgb::BLUE.lerp(Rgb::TEAL, 1.0), Rgb::TEAL);
        assert_eq!(Rgb::BLUE.lerp(Rgb::TEAL, 0.5), Rgb::new(0, 64, 192));
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(Rgb::BRIGHT_GREEN.to_hex(), "#39ff14");
        assert_eq!(serde_json::to_string(&Rgb::DARK_RED).unwrap(), "\"#8b0000\"");
    }
}
