// Hyprcursor theme output: a shape directory per cursor plus manifest.hl

pub mod compile;
pub mod meta;

use image::{ImageFormat, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, IoContext, Result};
use crate::model::Theme;
use crate::pipeline::encoder::{EncodedCursor, Format, ThemeEncoder};
use crate::pipeline::size_set::SizeSet;

pub use compile::compile_theme;
pub use meta::{Manifest, ShapeImage, ShapeMeta};

pub const CURSORS_DIR: &str = "hyprcursors";
pub const MANIFEST_FILE: &str = "manifest.hl";
pub const META_FILE: &str = "meta.hl";

pub struct HyprcursorEncoder {
    svg: bool,
}

impl HyprcursorEncoder {
    pub fn new(svg: bool) -> Self {
        Self { svg }
    }

    fn shape_meta(set: &SizeSet, images: Vec<ShapeImage>) -> ShapeMeta {
        ShapeMeta {
            resize: set.resize,
            hotspot_x: set.hotspot.x,
            hotspot_y: set.hotspot.y,
            overrides: set.aliases.clone(),
            images,
        }
    }

    fn frame_delay(set: &SizeSet) -> Option<u32> {
        match set.frame_delay() {
            0 => None,
            delay => Some(delay),
        }
    }

    fn encode_png_frames(&self, set: &SizeSet) -> Result<EncodedCursor> {
        let animated = set.is_animated();
        let delay = Self::frame_delay(set);
        let mut images = Vec::new();
        let mut files = Vec::new();

        for entry in &set.entries {
            for (i, frame) in entry.frames.iter().enumerate() {
                let file = if animated {
                    format!("{}_{}_{:02}.png", set.name, entry.size, i)
                } else {
                    format!("{}_{}.png", set.name, entry.size)
                };
                let bytes = encode_png(frame).map_err(|e| {
                    BuildError::encode(&set.name, Format::Hyprcursor, format!("{}: {}", file, e))
                })?;
                images.push(ShapeImage {
                    size: entry.size,
                    file: file.clone(),
                    delay,
                });
                files.push((file, bytes));
            }
        }

        if images.is_empty() {
            return Err(BuildError::encode(&set.name, Format::Hyprcursor, "no images to encode"));
        }

        Ok(EncodedCursor::Hyprcursor {
            name: set.name.clone(),
            meta: Self::shape_meta(set, images).render(),
            files,
        })
    }

    /// SVG shapes carry a single `define_size = 0` per frame.
    fn encode_svg_frames(&self, set: &SizeSet) -> Result<EncodedCursor> {
        let animated = set.is_animated();
        let delay = Self::frame_delay(set);
        let mut images = Vec::new();
        let mut files = Vec::new();

        for (i, source) in set.sources.iter().enumerate() {
            let file = if animated {
                format!("{}_{:02}.svg", set.name, i)
            } else {
                format!("{}.svg", set.name)
            };
            images.push(ShapeImage {
                size: 0,
                file: file.clone(),
                delay,
            });
            files.push((file, source.svg.as_bytes().to_vec()));
        }

        if images.is_empty() {
            return Err(BuildError::encode(&set.name, Format::Hyprcursor, "no frames to encode"));
        }

        Ok(EncodedCursor::Hyprcursor {
            name: set.name.clone(),
            meta: Self::shape_meta(set, images).render(),
            files,
        })
    }
}

impl ThemeEncoder for HyprcursorEncoder {
    fn format(&self) -> Format {
        Format::Hyprcursor
    }

    fn cursors_dir(&self, theme_dir: &Path) -> PathBuf {
        theme_dir.join(CURSORS_DIR)
    }

    fn index_files(&self, theme_dir: &Path) -> Vec<PathBuf> {
        vec![theme_dir.join(MANIFEST_FILE)]
    }

    fn encode(&self, set: &SizeSet) -> Result<EncodedCursor> {
        if self.svg {
            self.encode_svg_frames(set)
        } else {
            self.encode_png_frames(set)
        }
    }

    fn write_index(&self, theme: &Theme, _sets: &[SizeSet], theme_dir: &Path) -> Result<()> {
        let path = theme_dir.join(MANIFEST_FILE);
        fs::write(&path, manifest(theme).render())
            .io_context(format!("writing manifest of theme `{}`", theme.name), &path)
    }
}

pub fn manifest(theme: &Theme) -> Manifest {
    Manifest {
        name: theme.name.clone(),
        description: theme.comment.clone(),
        version: theme.version.clone(),
        cursors_directory: CURSORS_DIR.to_string(),
    }
}

pub fn encode_png(image: &RgbaImage) -> image::ImageResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
