//! PNG encoding for rendered overlays.
//!
//! Heatmap overlays are dominated by fully transparent pixels and a handful
//! of ramp colors, so [`encode_auto`] first tries an indexed (color type 3)
//! image and only falls back to truecolor RGBA (color type 6) when more than
//! 256 distinct colors are present. Blurred overlays usually take the RGBA
//! path.

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use heatmap_common::{HeatmapError, HeatmapResult};

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum palette entries for an indexed PNG.
const MAX_PALETTE_SIZE: usize = 256;

/// PNG color types written by this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorType {
    Indexed = 3,
    Rgba = 6,
}

impl ColorType {
    fn bytes_per_pixel(self) -> usize {
        match self {
            ColorType::Indexed => 1,
            ColorType::Rgba => 4,
        }
    }
}

/// An RGBA palette plus one index per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    pub palette: Vec<[u8; 4]>,
    pub indices: Vec<u8>,
}

/// Encode RGBA pixels, choosing indexed output when the colors fit.
pub fn encode_auto(pixels: &[u8], width: usize, height: usize) -> HeatmapResult<Vec<u8>> {
    check_len(pixels, width, height, 4)?;
    match extract_palette(pixels) {
        Some(image) => encode_indexed(&image, width, height),
        None => encode_rgba(pixels, width, height),
    }
}

/// Collect the distinct colors of `pixels` in first-seen order.
///
/// Returns `None` as soon as a 257th color shows up.
pub fn extract_palette(pixels: &[u8]) -> Option<IndexedImage> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let color = [px[0], px[1], px[2], px[3]];
        let index = match lookup.get(&color) {
            Some(&idx) => idx,
            None => {
                if palette.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push(color);
                lookup.insert(color, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some(IndexedImage { palette, indices })
}

/// Encode an indexed image (color type 3). A `tRNS` chunk is written when
/// any palette entry is not fully opaque.
pub fn encode_indexed(image: &IndexedImage, width: usize, height: usize) -> HeatmapResult<Vec<u8>> {
    check_len(&image.indices, width, height, 1)?;
    if image.palette.is_empty() || image.palette.len() > MAX_PALETTE_SIZE {
        return Err(HeatmapError::InternalError(format!(
            "palette must hold 1..={} colors, got {}",
            MAX_PALETTE_SIZE,
            image.palette.len()
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &header(width, height, ColorType::Indexed));

    let plte: Vec<u8> = image.palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if image.palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = image.palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(&image.indices, width, height, ColorType::Indexed)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Encode straight (non-premultiplied) RGBA pixels (color type 6).
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> HeatmapResult<Vec<u8>> {
    check_len(pixels, width, height, 4)?;

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &header(width, height, ColorType::Rgba));

    let idat = deflate_scanlines(pixels, width, height, ColorType::Rgba)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn check_len(data: &[u8], width: usize, height: usize, bpp: usize) -> HeatmapResult<()> {
    let expected = width * height * bpp;
    if data.len() != expected {
        return Err(HeatmapError::InternalError(format!(
            "pixel buffer holds {} bytes, {}x{} image needs {}",
            data.len(),
            width,
            height,
            expected
        )));
    }
    Ok(())
}

fn header(width: usize, height: usize, color_type: ColorType) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    ihdr[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    ihdr[8] = 8; // bit depth
    ihdr[9] = color_type as u8;
    // compression, filter and interlace methods all 0
    ihdr
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix every scanline with filter type 0 and zlib-compress the result.
fn deflate_scanlines(
    data: &[u8],
    width: usize,
    height: usize,
    color_type: ColorType,
) -> HeatmapResult<Vec<u8>> {
    let stride = width * color_type.bytes_per_pixel();
    let mut raw = Vec::with_capacity(height * (stride + 1));
    for row in data.chunks_exact(stride.max(1)).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }
    if stride == 0 {
        raw.resize(height, 0);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder
        .write_all(&raw)
        .map_err(|e| HeatmapError::InternalError(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| HeatmapError::InternalError(format!("IDAT compression failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_palette_first_seen_order() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 0, 0, 0, // transparent
            255, 0, 0, 255, // red again
        ];
        let image = extract_palette(&pixels).unwrap();
        assert_eq!(image.palette, vec![[255, 0, 0, 255], [0, 0, 0, 0]]);
        assert_eq!(image.indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_extract_palette_overflow() {
        let pixels: Vec<u8> = (0..257u32).flat_map(|i| [i as u8, (i >> 8) as u8, 0, 255]).collect();
        assert!(extract_palette(&pixels).is_none());
    }

    #[test]
    fn test_chunk_crc_covers_type_and_data() {
        let mut png = Vec::new();
        write_chunk(&mut png, b"IEND", &[]);
        assert_eq!(&png[0..4], &[0, 0, 0, 0]);
        assert_eq!(&png[4..8], b"IEND");
        assert_eq!(&png[8..12], &crc32fast::hash(b"IEND").to_be_bytes());
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = encode_rgba(&[0u8; 12], 2, 2).unwrap_err();
        assert!(matches!(err, HeatmapError::InternalError(_)));
    }
}
