use byteorder::{LittleEndian, WriteBytesExt};
use image::RgbaImage;
use std::io::{self, Write};

pub const MAGIC: &[u8] = b"Xcur";
pub const FILE_HEADER_SIZE: u32 = 16;
pub const VERSION: u32 = 0x0001_0000;
pub const CHUNK_IMAGE: u32 = 0xFFFD_0002;
pub const IMAGE_HEADER_SIZE: u32 = 36;
pub const IMAGE_VERSION: u32 = 1;
const TOC_ENTRY_SIZE: u32 = 12;

/// Largest width/height libXcursor accepts.
pub const MAX_IMAGE_SIZE: u32 = 0x7FFF;

pub struct ImageChunk<'a> {
    pub nominal: u32,
    pub hotspot: (u32, u32),
    pub delay: u32,
    pub image: &'a RgbaImage,
}

impl ImageChunk<'_> {
    fn byte_len(&self) -> u64 {
        IMAGE_HEADER_SIZE as u64 + self.image.width() as u64 * self.image.height() as u64 * 4
    }
}

/// Total file size for `chunks`, or `None` if positions overflow `u32`.
pub fn encoded_len(chunks: &[ImageChunk<'_>]) -> Option<u32> {
    let toc = chunks.len() as u64 * TOC_ENTRY_SIZE as u64;
    let body: u64 = chunks.iter().map(|c| c.byte_len()).sum();
    u32::try_from(FILE_HEADER_SIZE as u64 + toc + body).ok()
}

pub fn to_x11(chunks: &[ImageChunk<'_>]) -> io::Result<Vec<u8>> {
    let total = encoded_len(chunks)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "cursor file exceeds 4 GiB"))?;
    let mut output = Vec::with_capacity(total as usize);

    output.write_all(MAGIC)?;
    output.write_u32::<LittleEndian>(FILE_HEADER_SIZE)?;
    output.write_u32::<LittleEndian>(VERSION)?;
    output.write_u32::<LittleEndian>(chunks.len() as u32)?;

    let mut position = FILE_HEADER_SIZE + chunks.len() as u32 * TOC_ENTRY_SIZE;
    for chunk in chunks {
        output.write_u32::<LittleEndian>(CHUNK_IMAGE)?;
        output.write_u32::<LittleEndian>(chunk.nominal)?;
        output.write_u32::<LittleEndian>(position)?;
        position += chunk.byte_len() as u32;
    }

    for chunk in chunks {
        output.write_u32::<LittleEndian>(IMAGE_HEADER_SIZE)?;
        output.write_u32::<LittleEndian>(CHUNK_IMAGE)?;
        output.write_u32::<LittleEndian>(chunk.nominal)?;
        output.write_u32::<LittleEndian>(IMAGE_VERSION)?;
        output.write_u32::<LittleEndian>(chunk.image.width())?;
        output.write_u32::<LittleEndian>(chunk.image.height())?;
        output.write_u32::<LittleEndian>(chunk.hotspot.0)?;
        output.write_u32::<LittleEndian>(chunk.hotspot.1)?;
        output.write_u32::<LittleEndian>(chunk.delay)?;
        write_premultiplied(&mut output, chunk.image)?;
    }

    Ok(output)
}

/// Pixels as little-endian ARGB32 with premultiplied alpha (B, G, R, A bytes).
fn write_premultiplied<W: Write>(out: &mut W, image: &RgbaImage) -> io::Result<()> {
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        out.write_all(&[
            premultiply(b, a),
            premultiply(g, a),
            premultiply(r, a),
            a,
        ])?;
    }
    Ok(())
}

fn premultiply(c: u8, a: u8) -> u8 {
    ((c as u32 * a as u32 + 127) / 255) as u8
}
