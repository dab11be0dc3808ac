//! PNG encoding for rendered RGBA frames.
//!
//! Two colour types are written:
//! - **Indexed (type 3)** when a frame uses at most 256 colours. Heatmap
//!   frames quantised through a colour ramp and flat charts usually qualify.
//! - **RGBA (type 6)** otherwise (anti-aliased text and curves).
//!
//! [`create_png_auto`] picks the smallest applicable encoding.

use std::collections::HashMap;
use std::io::Write;

use crate::error::{RenderError, RenderResult};

/// Maximum colours for an indexed PNG.
const MAX_PALETTE_SIZE: usize = 256;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Scanline filter types used by the encoder.
const FILTER_NONE: u8 = 0;
const FILTER_SUB: u8 = 1;

/// Colour type chosen for an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngEncoding {
    Indexed,
    Rgba,
}

/// Encode RGBA pixels, choosing indexed colour when the frame allows it.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    encode_with_choice(pixels, width, height).map(|(png, _)| png)
}

/// Encode RGBA pixels and report which colour type was used.
pub fn encode_with_choice(
    pixels: &[u8],
    width: usize,
    height: usize,
) -> RenderResult<(Vec<u8>, PngEncoding)> {
    check_len(pixels.len(), width, height, 4)?;
    match extract_palette(pixels) {
        Some((palette, indices)) => Ok((
            create_png_indexed(width, height, &palette, &indices)?,
            PngEncoding::Indexed,
        )),
        None => Ok((create_png(pixels, width, height)?, PngEncoding::Rgba)),
    }
}

#[inline(always)]
fn pack_color(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

/// Build a palette in first-seen order, or `None` past 256 colours.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack_color(px);
        let index = match lookup.get(&key) {
            Some(&i) => i,
            None => {
                if palette.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let i = palette.len() as u8;
                palette.push([px[0], px[1], px[2], px[3]]);
                lookup.insert(key, i);
                i
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Write an indexed PNG (colour type 3) from a palette and one index per
/// pixel.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> RenderResult<Vec<u8>> {
    check_len(indices.len(), width, height, 1)?;
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(RenderError::Encode(format!(
            "palette must hold 1 to 256 colours, got {}",
            palette.len()
        )));
    }

    let mut png = Vec::with_capacity(indices.len() / 2 + palette.len() * 4 + 64);
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    // Alpha entries only up to the last translucent colour
    if let Some(last) = palette.iter().rposition(|c| c[3] < 255) {
        let trns: Vec<u8> = palette[..=last].iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width, height, 1, FILTER_NONE)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Write an RGBA PNG (colour type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    check_len(pixels.len(), width, height, 4)?;

    let mut png = Vec::with_capacity(pixels.len() / 2 + 64);
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    let idat = deflate_scanlines(pixels, width, height, 4, FILTER_SUB)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_len(len: usize, width: usize, height: usize, bpp: usize) -> RenderResult<()> {
    if width == 0 || height == 0 || len != width * height * bpp {
        return Err(RenderError::Encode(format!(
            "{} bytes for a {}x{} image at {} bytes per pixel",
            len, width, height, bpp
        )));
    }
    Ok(())
}

fn ihdr(width: usize, height: usize, color_type: u8) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    data[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = color_type;
    // compression, filter and interlace methods stay 0
    data
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

/// Prefix each scanline with its filter byte and zlib-compress the result.
///
/// `FILTER_SUB` stores each byte as the difference with the byte `bpp`
/// positions to its left, which shrinks flat chart backgrounds.
fn deflate_scanlines(
    data: &[u8],
    width: usize,
    height: usize,
    bpp: usize,
    filter: u8,
) -> RenderResult<Vec<u8>> {
    let stride = width * bpp;
    let mut raw = Vec::with_capacity(height * (stride + 1));

    for row in data.chunks_exact(stride) {
        raw.push(filter);
        match filter {
            FILTER_SUB => {
                raw.extend_from_slice(&row[..bpp]);
                raw.extend(
                    row[bpp..]
                        .iter()
                        .zip(row)
                        .map(|(&cur, &left)| cur.wrapping_sub(left)),
                );
            }
            _ => raw.extend_from_slice(row),
        }
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&raw)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))
}
