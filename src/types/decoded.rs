//! Decoded image frames

use image::RgbImage;

/// A decoded 8-bit image with interleaved channels.
///
/// Construction rejects empty images, so a `DecodedImage` always holds at
/// least one pixel. Cloning copies the pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl DecodedImage {
    /// Channel count of images produced by the relay decoder.
    pub const RGB_CHANNELS: u8 = 3;

    /// Build an image from raw interleaved bytes.
    ///
    /// Returns `None` when any dimension is zero or the buffer length does not
    /// match `width * height * channels`.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || channels == 0 {
            return None;
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return None;
        }
        Some(Self { width, height, channels, data })
    }

    /// Build a single-colour RGB image.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Option<Self> {
        let pixels = width as usize * height as usize;
        let data = rgb.iter().copied().cycle().take(pixels * 3).collect();
        Self::new(width, height, Self::RGB_CHANNELS, data)
    }

    /// Wrap an `image` crate RGB buffer.
    pub fn from_rgb(image: RgbImage) -> Option<Self> {
        let (width, height) = image.dimensions();
        Self::new(width, height, Self::RGB_CHANNELS, image.into_raw())
    }

    /// Convert back into an `image` crate RGB buffer.
    ///
    /// Returns `None` for images that are not three-channel.
    pub fn to_rgb(&self) -> Option<RgbImage> {
        if self.channels != Self::RGB_CHANNELS {
            return None;
        }
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (u32, u32, u8) {
        (self.height, self.width, self.channels)
    }

    /// Raw interleaved pixel bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Channel values of the pixel at (`x`, `y`), or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.channels as usize;
        let start = (y as usize * self.width as usize + x as usize) * channels;
        self.data.get(start..start + channels)
    }
}
