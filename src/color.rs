// color.rs — RGB cell colours, RGBA paint, and `#rrggbb` conversion

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GridError;

// ── Rgb ───────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Uniformly random over all 2^24 colours.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen(), rng.gen(), rng.gen())
    }

    /// Parse `#RRGGBB` (the `#` is optional, either case).
    pub fn from_hex(s: &str) -> Result<Self, GridError> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(GridError::BadColor(s.to_owned()));
        }
        let p = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| GridError::BadColor(s.to_owned()))
        };
        Ok(Self::new(p(0)?, p(2)?, p(4)?))
    }

    /// Lowercase `#rrggbb`, zero-padded.
    pub fn to_hex(self) -> String {
        self.to_string()
    }

    pub fn with_alpha(self, alpha: u8) -> Rgba {
        Rgba(self.red, self.green, self.blue, alpha)
    }

    pub fn opaque(self) -> Rgba {
        self.with_alpha(0xFF)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl FromStr for Rgb {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// ── Rgba ──────────────────────────────────────────────────────────────────────

/// Paint colour with straight (non-premultiplied) alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    /// Opacity in `[0, 1]` mapped onto the alpha byte.
    pub fn from_opacity(rgb: Rgb, opacity: f32) -> Self {
        rgb.with_alpha((opacity.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Source-over composite of `self` onto an opaque destination pixel.
    pub fn over(self, dst: [u8; 3]) -> [u8; 3] {
        let a = self.3 as u32;
        let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
        [mix(self.0, dst[0]), mix(self.1, dst[1]), mix(self.2, dst[2])]
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn hex_is_lowercase_and_zero_padded() {
        assert_eq!(Rgb::new(1, 0x0A, 0xFF).to_hex(), "#010aff");
        assert_eq!(Rgb::new(0, 0, 0).to_hex(), "#000000");
    }

    #[test]
    fn parse_accepts_case_and_missing_hash() {
        assert_eq!(Rgb::from_hex("#115DF2").unwrap(), Rgb::new(0x11, 0x5d, 0xf2));
        assert_eq!(Rgb::from_hex("d8d8d8").unwrap(), Rgb::new(0xd8, 0xd8, 0xd8));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn hex_round_trip_reproduces_input() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let c = Rgb::random(&mut rng);
            let hex = c.to_hex();
            assert_eq!(hex.len(), 7);
            assert_eq!(Rgb::from_hex(&hex).unwrap().to_hex(), hex);
        }
    }

    #[test]
    fn over_endpoints() {
        let dst = [10, 20, 30];
        assert_eq!(Rgb::new(200, 100, 0).with_alpha(0).over(dst), dst);
        assert_eq!(Rgb::new(200, 100, 0).opaque().over(dst), [200, 100, 0]);
    }

    #[test]
    fn opacity_maps_to_alpha() {
        assert_eq!(Rgba::from_opacity(Rgb::WHITE, 0.5).3, 128);
        assert_eq!(Rgba::from_opacity(Rgb::WHITE, 2.0).3, 255);
    }
}
