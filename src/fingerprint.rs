use std::{fmt, str::FromStr};

use image::RgbImage;
use sha2::{Digest, Sha256};

use crate::error::FingerprintParseError;

/// SHA-256 of an image's raw pixel bytes, kept as lowercase hex.
///
/// The hex form is what ends up in the `generated_images.hash` column and in
/// the output file name, so it is the canonical representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

pub const HEX_LEN: usize = 64;

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut h = Sha256::new();
        h.update(bytes);
        Self(format!("{:x}", h.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<hex>.png`
    pub fn file_name(&self) -> String {
        format!("{}.png", self.0)
    }
}

/// Fingerprint of the pixel data in row-major RGB order.
pub fn fingerprint(img: &RgbImage) -> Fingerprint {
    Fingerprint::of_bytes(img.as_raw())
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ok = s.len() == HEX_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if ok {
            Ok(Self(s.to_string()))
        } else {
            Err(FingerprintParseError(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn known_digest() {
        // sha256("")
        let fp = Fingerprint::of_bytes(b"");
        assert_eq!(
            fp.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn deterministic_over_identical_pixels() {
        let a = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let b = a.clone();
        assert_eq!(fingerprint(&a), fingerprint(&a));
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn single_pixel_change_changes_fingerprint() {
        let a = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let mut b = a.clone();
        b.put_pixel(3, 2, Rgb([10, 20, 31]));
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn hashes_row_major_bytes() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([1, 2, 3]));
        img.put_pixel(1, 0, Rgb([4, 5, 6]));
        assert_eq!(fingerprint(&img), Fingerprint::of_bytes(&[1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn parse_accepts_only_lowercase_hex_digest() {
        let fp = Fingerprint::of_bytes(b"abc");
        assert_eq!(fp.as_str().parse::<Fingerprint>().unwrap(), fp);
        assert!("abc".parse::<Fingerprint>().is_err());
        assert!(fp.as_str().to_uppercase().parse::<Fingerprint>().is_err());
        assert_eq!(fp.file_name(), format!("{}.png", fp));
    }
}
