//! Image payload decoding
//!
//! Inbound binary frames carry an encoded image whose container is not
//! negotiated; the format is guessed from the payload's magic bytes. Every
//! frame is normalized to 8-bit RGB.

use image::{ImageFormat, RgbImage};
use std::io::Cursor;

use crate::types::DecodedImage;
use crate::{RelayError, Result};

/// Decode a binary payload into an RGB image.
///
/// Fails on empty payloads, unknown containers, truncated data, and images
/// with a zero dimension.
pub fn decode_frame(payload: &[u8]) -> Result<DecodedImage> {
    if payload.is_empty() {
        return Err(RelayError::Decode { bytes: 0, details: "empty payload".to_string() });
    }

    let decoded = image::load_from_memory(payload)
        .map_err(|e| RelayError::Decode { bytes: payload.len(), details: e.to_string() })?;

    DecodedImage::from_rgb(decoded.into_rgb8()).ok_or_else(|| RelayError::Decode {
        bytes: payload.len(),
        details: "decoded image has no pixels".to_string(),
    })
}

/// Encode an RGB image the way a client would before sending it.
pub fn encode_frame(image: &DecodedImage, format: ImageFormat) -> Result<Vec<u8>> {
    let rgb: RgbImage = image.to_rgb().ok_or_else(|| RelayError::Parse {
        context: "frame encoding".to_string(),
        details: format!("expected 3 channels, got {}", image.channels()),
    })?;

    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, format).map_err(|e| RelayError::Parse {
        context: "frame encoding".to_string(),
        details: e.to_string(),
    })?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn png_round_trip_is_lossless() {
        let image = DecodedImage::filled(8, 4, [10, 20, 30]).unwrap();
        let payload = encode_frame(&image, ImageFormat::Png).unwrap();

        assert_eq!(decode_frame(&payload).unwrap(), image);
    }

    #[test]
    fn jpeg_round_trip_stays_close() {
        let image = DecodedImage::filled(64, 64, [255, 0, 0]).unwrap();
        let payload = encode_frame(&image, ImageFormat::Jpeg).unwrap();
        let decoded = decode_frame(&payload).unwrap();

        assert_eq!(decoded.shape(), (64, 64, 3));
        let px = decoded.pixel(32, 32).unwrap();
        assert!(px[0] > 240 && px[1] < 16 && px[2] < 16, "pixel {px:?}");
    }

    #[test]
    fn empty_payload_fails() {
        let err = decode_frame(&[]).unwrap_err();
        assert!(matches!(err, RelayError::Decode { bytes: 0, .. }));
    }

    #[test]
    fn truncated_jpeg_fails() {
        let image = DecodedImage::filled(16, 16, [0, 255, 0]).unwrap();
        let payload = encode_frame(&image, ImageFormat::Jpeg).unwrap();

        assert!(decode_frame(&payload[..4]).is_err());
    }

    proptest! {
        #[test]
        fn arbitrary_text_never_decodes(text in "x[a-z0-9 ]{0,255}") {
            prop_assert!(decode_frame(text.as_bytes()).is_err());
        }
    }
}
