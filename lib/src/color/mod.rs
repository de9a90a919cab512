//! Colour mixing helpers.
//!
//! Estimate the colour a weighted blend of filaments approaches, and express
//! it in CMYK terms so it can be turned back into a ratio schedule.

use std::fmt;

use thiserror::Error;

/// Colour parsing and mixing errors.
#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("invalid hex colour '{0}', expected #rrggbb")]
    InvalidHex(String),

    #[error("at least two colours are needed to mix, got {0}")]
    NotEnoughColors(usize),

    #[error("colour weights sum to zero")]
    ZeroWeight,
}

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ColorError::InvalidHex(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorError::InvalidHex(hex.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to CMYK percentages.
    pub fn to_cmyk(self) -> Cmyk {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let k = (1.0 - r).min(1.0 - g).min(1.0 - b);

        let (c, m, y) = if k == 1.0 {
            (0.0, 0.0, 0.0)
        } else {
            (
                (1.0 - r - k) / (1.0 - k),
                (1.0 - g - k) / (1.0 - k),
                (1.0 - b - k) / (1.0 - k),
            )
        };

        let percent = |v: f64| (v * 100.0).round() as u8;
        Cmyk {
            c: percent(c),
            m: percent(m),
            y: percent(y),
            k: percent(k),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// CMYK components in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cmyk {
    pub c: u8,
    pub m: u8,
    pub y: u8,
    pub k: u8,
}

impl fmt::Display for Cmyk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C={} M={} Y={} K={}", self.c, self.m, self.y, self.k)
    }
}

/// Weighted average of colours. Channels are truncated, not rounded.
pub fn mix_colors(colors: &[(Rgb, f64)]) -> Result<Rgb, ColorError> {
    if colors.len() < 2 {
        return Err(ColorError::NotEnoughColors(colors.len()));
    }
    let total: f64 = colors.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return Err(ColorError::ZeroWeight);
    }

    let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
    for (color, weight) in colors {
        r += color.r as f64 * weight;
        g += color.g as f64 * weight;
        b += color.b as f64 * weight;
    }

    Ok(Rgb::new(
        (r / total) as u8,
        (g / total) as u8,
        (b / total) as u8,
    ))
}

/// Parse `#rrggbb` strings with weights and mix them.
pub fn mix_hex(colors: &[(&str, f64)]) -> Result<Rgb, ColorError> {
    let parsed = colors
        .iter()
        .map(|(hex, w)| Rgb::from_hex(hex).map(|rgb| (rgb, *w)))
        .collect::<Result<Vec<_>, _>>()?;
    mix_colors(&parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let rgb = Rgb::from_hex("#FF5733").unwrap();
        assert_eq!(rgb, Rgb::new(255, 87, 51));
        assert_eq!(rgb.to_hex(), "#ff5733");
        assert_eq!(Rgb::from_hex("00ff00").unwrap(), Rgb::new(0, 255, 0));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(matches!(Rgb::from_hex("#fff"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(Rgb::from_hex("#gg0000"), Err(ColorError::InvalidHex(_))));
    }

    #[test]
    fn test_mix_equal_weights() {
        let mixed = mix_hex(&[("#ff0000", 1.0), ("#0000ff", 1.0)]).unwrap();
        assert_eq!(mixed, Rgb::new(127, 0, 127));
    }

    #[test]
    fn test_mix_weighted() {
        let mixed = mix_hex(&[("#ffffff", 3.0), ("#000000", 1.0)]).unwrap();
        assert_eq!(mixed, Rgb::new(191, 191, 191));
    }

    #[test]
    fn test_mix_errors() {
        assert_eq!(mix_hex(&[("#ffffff", 1.0)]), Err(ColorError::NotEnoughColors(1)));
        assert_eq!(
            mix_hex(&[("#ffffff", 0.0), ("#000000", 0.0)]),
            Err(ColorError::ZeroWeight)
        );
    }

    #[test]
    fn test_to_cmyk() {
        assert_eq!(Rgb::new(0, 0, 0).to_cmyk(), Cmyk { c: 0, m: 0, y: 0, k: 100 });
        assert_eq!(Rgb::new(255, 255, 255).to_cmyk(), Cmyk { c: 0, m: 0, y: 0, k: 0 });
        assert_eq!(Rgb::new(0, 255, 255).to_cmyk(), Cmyk { c: 100, m: 0, y: 0, k: 0 });
        assert_eq!(Rgb::new(255, 0, 0).to_cmyk().to_string(), "C=0 M=100 Y=100 K=0");
    }
}
