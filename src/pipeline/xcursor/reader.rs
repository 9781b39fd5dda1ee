use anyhow::{Result, anyhow};
use byteorder::{LittleEndian, ReadBytesExt};
use image::{Rgba, RgbaImage};
use std::io::{Cursor, Read};
use std::path::Path;

use super::writer::{CHUNK_IMAGE, FILE_HEADER_SIZE, IMAGE_HEADER_SIZE, IMAGE_VERSION, MAGIC, VERSION};

#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub size: u32,
    pub xhot: u32,
    pub yhot: u32,
    pub delay: u32,
    /// Straight alpha.
    pub pixels: RgbaImage,
}

#[derive(Debug)]
pub struct XcursorFile {
    pub images: Vec<DecodedImage>,
}

impl XcursorFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(anyhow!("Invalid Xcursor magic bytes"));
        }

        let header_size = cursor.read_u32::<LittleEndian>()?;
        if header_size != FILE_HEADER_SIZE {
            return Err(anyhow!("Invalid Xcursor header size: {}", header_size));
        }

        let version = cursor.read_u32::<LittleEndian>()?;
        if version != VERSION {
            return Err(anyhow!("Unsupported Xcursor version: 0x{:08x}", version));
        }

        let ntoc = cursor.read_u32::<LittleEndian>()?;
        let mut toc = Vec::new();
        for _ in 0..ntoc {
            let chunk_type = cursor.read_u32::<LittleEndian>()?;
            let subtype = cursor.read_u32::<LittleEndian>()?;
            let position = cursor.read_u32::<LittleEndian>()?;
            if chunk_type == CHUNK_IMAGE {
                toc.push((subtype, position));
            }
        }

        let mut images = Vec::with_capacity(toc.len());
        for (size, position) in toc {
            cursor.set_position(position as u64);

            let chunk_header = cursor.read_u32::<LittleEndian>()?;
            let chunk_type = cursor.read_u32::<LittleEndian>()?;
            let subtype = cursor.read_u32::<LittleEndian>()?;
            if chunk_type != CHUNK_IMAGE || subtype != size {
                return Err(anyhow!("TOC entry at {} does not match its chunk", position));
            }
            if chunk_header != IMAGE_HEADER_SIZE {
                return Err(anyhow!("Invalid chunk header size: {}", chunk_header));
            }

            let version = cursor.read_u32::<LittleEndian>()?;
            if version != IMAGE_VERSION {
                return Err(anyhow!("Unsupported image version: {}", version));
            }

            let width = cursor.read_u32::<LittleEndian>()?;
            let height = cursor.read_u32::<LittleEndian>()?;
            let xhot = cursor.read_u32::<LittleEndian>()?;
            let yhot = cursor.read_u32::<LittleEndian>()?;
            let delay = cursor.read_u32::<LittleEndian>()?;

            let needed = width as u64 * height as u64 * 4;
            let remaining = (data.len() as u64).saturating_sub(cursor.position());
            if needed > remaining {
                return Err(anyhow!("Truncated image data at {}", position));
            }

            let mut pixels = RgbaImage::new(width, height);
            for pixel in pixels.pixels_mut() {
                let mut bgra = [0u8; 4];
                cursor.read_exact(&mut bgra)?;
                let [b, g, r, a] = bgra;
                *pixel = Rgba([
                    unpremultiply(r, a),
                    unpremultiply(g, a),
                    unpremultiply(b, a),
                    a,
                ]);
            }

            images.push(DecodedImage {
                size,
                xhot,
                yhot,
                delay,
                pixels,
            });
        }

        if images.is_empty() {
            return Err(anyhow!("No valid cursor images found"));
        }

        Ok(XcursorFile { images })
    }

    pub fn sizes(&self) -> Vec<u32> {
        let mut sizes: Vec<u32> = self.images.iter().map(|img| img.size).collect();
        sizes.sort_unstable();
        sizes.dedup();
        sizes
    }
}

fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::xcursor::writer::{ImageChunk, to_x11};

    #[test]
    fn test_magic_validation() {
        assert!(XcursorFile::from_bytes(b"INVALID").is_err());
        assert!(XcursorFile::from_bytes(b"Xcur").is_err());
    }

    #[test]
    fn test_parse_handwritten_file() {
        let mut data = Vec::new();
        data.extend_from_slice(b"Xcur");
        data.extend_from_slice(&16u32.to_le_bytes());
        data.extend_from_slice(&0x0001_0000u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());

        data.extend_from_slice(&0xfffd0002u32.to_le_bytes());
        data.extend_from_slice(&32u32.to_le_bytes());
        data.extend_from_slice(&28u32.to_le_bytes());

        data.extend_from_slice(&36u32.to_le_bytes());
        data.extend_from_slice(&0xfffd0002u32.to_le_bytes());
        data.extend_from_slice(&32u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        for _ in 0..4 {
            data.extend_from_slice(&[64, 128, 255, 255]);
        }

        let file = XcursorFile::from_bytes(&data).unwrap();
        assert_eq!(file.images.len(), 1);
        let img = &file.images[0];
        assert_eq!(img.pixels.dimensions(), (2, 2));
        assert_eq!((img.xhot, img.yhot), (1, 1));
        assert_eq!(img.pixels.get_pixel(0, 0), &Rgba([255, 128, 64, 255]));
    }

    #[test]
    fn test_truncated_file_fails() {
        let img = RgbaImage::new(4, 4);
        let data = to_x11(&[ImageChunk {
            nominal: 4,
            hotspot: (0, 0),
            delay: 0,
            image: &img,
        }])
        .unwrap();
        assert!(XcursorFile::from_bytes(&data[..data.len() - 1]).is_err());
    }

    #[test]
    fn test_round_trip_alpha() {
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, Rgba([200, 100, 50, 255]));
        let data = to_x11(&[ImageChunk {
            nominal: 1,
            hotspot: (0, 0),
            delay: 0,
            image: &img,
        }])
        .unwrap();

        let file = XcursorFile::from_bytes(&data).unwrap();
        assert_eq!(file.images[0].pixels.get_pixel(0, 0), &Rgba([200, 100, 50, 255]));
    }
}
