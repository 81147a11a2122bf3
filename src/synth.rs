use image::{Rgb, RgbImage};
use rand::Rng;

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Black, white or a uniformly random colour, each with probability 1/3.
pub fn background<R: Rng>(rng: &mut R) -> Rgb<u8> {
    let random = Rgb(rng.random::<[u8; 3]>());
    match rng.random_range(0..3) {
        0 => BLACK,
        1 => WHITE,
        _ => random,
    }
}

/// One random candidate: background fill, then every pixel overwritten with an
/// independent uniform RGB triple. The background never survives the second
/// pass.
pub fn random_image<R: Rng>(rng: &mut R, width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, background(rng));
    for p in img.pixels_mut() {
        *p = Rgb(rng.random::<[u8; 3]>());
    }
    img
}
