/// A straight-alpha sRGB color, packed as one byte per channel.
///
/// Equality is exact, which the blank-canvas detection relies upon.
#[repr(transparent)]
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable, Debug, Default,
)]
pub struct Color([u8; 4]);
impl Color {
    pub const TRANSPARENT: Self = Self([0; 4]);
    pub const WHITE: Self = Self([255; 4]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }
    #[must_use]
    pub const fn as_array(&self) -> [u8; 4] {
        self.0
    }
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        self.0[3]
    }
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        self.0[3] == u8::MAX
    }
    /// Parse `#rrggbb` or `#rrggbbaa`. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit);
        }
        let channel = |idx: usize| -> Result<u8, ColorParseError> {
            u8::from_str_radix(&digits[idx * 2..idx * 2 + 2], 16)
                .map_err(|_| ColorParseError::InvalidDigit)
        };
        match digits.len() {
            6 => Ok(Self::rgb(channel(0)?, channel(1)?, channel(2)?)),
            8 => Ok(Self::rgba(channel(0)?, channel(1)?, channel(2)?, channel(3)?)),
            _ => Err(ColorParseError::BadLength),
        }
    }
    /// Format as `#rrggbb`, or `#rrggbbaa` when not opaque.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.0;
        if self.is_opaque() {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
    /// Source-over composite `self` onto `dst`.
    #[must_use]
    pub fn over(self, dst: Self) -> Self {
        match self.alpha() {
            u8::MAX => self,
            0 => dst,
            src_a => {
                let src_a = u32::from(src_a);
                let dst_a = u32::from(dst.alpha());
                // All in 0..=255 fixed point.
                let out_a = src_a + dst_a * (255 - src_a) / 255;
                if out_a == 0 {
                    return Self::TRANSPARENT;
                }
                let mix = |s: u8, d: u8| -> u8 {
                    let s = u32::from(s) * src_a;
                    let d = u32::from(d) * dst_a * (255 - src_a) / 255;
                    // Bounded by 255 * out_a, so fits.
                    ((s + d) / out_a) as u8
                };
                Self([
                    mix(self.0[0], dst.0[0]),
                    mix(self.0[1], dst.0[1]),
                    mix(self.0[2], dst.0[2]),
                    out_a as u8,
                ])
            }
        }
    }
}
impl From<Color> for image::Rgba<u8> {
    fn from(value: Color) -> Self {
        image::Rgba(value.0)
    }
}
impl From<image::Rgba<u8>> for Color {
    fn from(value: image::Rgba<u8>) -> Self {
        Self(value.0)
    }
}
impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
impl std::str::FromStr for Color {
    type Err = ColorParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        Self::from_hex(&string).map_err(serde::de::Error::custom)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorParseError {
    #[error("expected 6 or 8 hex digits")]
    BadLength,
    #[error("invalid hex digit")]
    InvalidDigit,
}

#[cfg(test)]
mod test {
    use super::{Color, ColorParseError};
    #[test]
    fn hex_parse() {
        assert_eq!(Color::from_hex("#ffffff"), Ok(Color::WHITE));
        assert_eq!(Color::from_hex("000000"), Ok(Color::BLACK));
        assert_eq!(
            Color::from_hex("#11223380"),
            Ok(Color::rgba(0x11, 0x22, 0x33, 0x80))
        );
        assert_eq!(Color::from_hex("#fff"), Err(ColorParseError::BadLength));
        assert_eq!(Color::from_hex("#gg0000"), Err(ColorParseError::InvalidDigit));
        assert_eq!(Color::from_hex("#ééé0"), Err(ColorParseError::InvalidDigit));
        // Signs are not digits, even where integer parsing would take them.
        assert_eq!(Color::from_hex("#+f+f+f"), Err(ColorParseError::InvalidDigit));
        assert_eq!(Color::from_hex("+fffffff"), Err(ColorParseError::InvalidDigit));
    }
    #[test]
    fn hex_format() {
        assert_eq!(Color::rgb(0xc7, 0xed, 0xcc).to_hex(), "#c7edcc");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_string(), "#01020304");
    }
    #[test]
    fn over_opaque_replaces() {
        assert_eq!(Color::BLACK.over(Color::WHITE), Color::BLACK);
        assert_eq!(Color::TRANSPARENT.over(Color::WHITE), Color::WHITE);
    }
    #[test]
    fn over_half_alpha_mixes() {
        let mixed = Color::rgba(0, 0, 0, 128).over(Color::WHITE);
        assert_eq!(mixed.alpha(), 255);
        // Roughly half-way.
        assert!((120..=135).contains(&mixed.as_array()[0]));
    }
}
