// Xcursor theme output: one binary per cursor plus index.theme

pub mod reader;
pub mod writer;

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, IoContext, Result};
use crate::model::Theme;
use crate::pipeline::encoder::{EncodedCursor, Format, ThemeEncoder};
use crate::pipeline::size_set::SizeSet;

pub use reader::{DecodedImage, XcursorFile};
use writer::{ImageChunk, MAX_IMAGE_SIZE, encoded_len, to_x11};

pub const CURSORS_DIR: &str = "cursors";
pub const INDEX_FILE: &str = "index.theme";
pub const CURSOR_THEME_FILE: &str = "cursor.theme";

pub struct XcursorEncoder;

impl XcursorEncoder {
    fn chunks<'a>(&self, set: &'a SizeSet) -> Result<Vec<ImageChunk<'a>>> {
        let delay = set.frame_delay();
        let mut chunks = Vec::new();

        for entry in &set.entries {
            if entry.size > MAX_IMAGE_SIZE {
                return Err(size_limit_error(&set.name, entry.size));
            }
            if entry.hotspot.0 >= entry.size || entry.hotspot.1 >= entry.size {
                return Err(BuildError::encode(
                    &set.name,
                    Format::Xcursor,
                    format!("hotspot {:?} lies outside the {}px image", entry.hotspot, entry.size),
                ));
            }

            for (i, frame) in entry.frames.iter().enumerate() {
                if frame.dimensions() != (entry.size, entry.size) {
                    return Err(BuildError::encode(
                        &set.name,
                        Format::Xcursor,
                        format!(
                            "frame {} at size {} is {}x{}",
                            i,
                            entry.size,
                            frame.width(),
                            frame.height()
                        ),
                    ));
                }
                chunks.push(ImageChunk {
                    nominal: entry.size,
                    hotspot: entry.hotspot,
                    delay,
                    image: frame,
                });
            }
        }

        if chunks.is_empty() {
            return Err(BuildError::encode(&set.name, Format::Xcursor, "no images to encode"));
        }
        if encoded_len(&chunks).is_none() {
            return Err(BuildError::encode(&set.name, Format::Xcursor, "file would exceed 4 GiB"));
        }
        Ok(chunks)
    }
}

impl ThemeEncoder for XcursorEncoder {
    fn format(&self) -> Format {
        Format::Xcursor
    }

    fn cursors_dir(&self, theme_dir: &Path) -> PathBuf {
        theme_dir.join(CURSORS_DIR)
    }

    fn index_files(&self, theme_dir: &Path) -> Vec<PathBuf> {
        vec![theme_dir.join(INDEX_FILE), theme_dir.join(CURSOR_THEME_FILE)]
    }

    fn check(&self, theme: &Theme) -> Result<()> {
        for def in &theme.cursors {
            if let Some(&size) = def.sizes.iter().find(|&&s| s > MAX_IMAGE_SIZE) {
                return Err(size_limit_error(&def.name, size));
            }
        }
        Ok(())
    }

    fn encode(&self, set: &SizeSet) -> Result<EncodedCursor> {
        let chunks = self.chunks(set)?;
        let data = to_x11(&chunks)
            .map_err(|e| BuildError::encode(&set.name, Format::Xcursor, e.to_string()))?;

        Ok(EncodedCursor::Xcursor {
            name: set.name.clone(),
            aliases: set.aliases.clone(),
            data,
        })
    }

    fn write_index(&self, theme: &Theme, sets: &[SizeSet], theme_dir: &Path) -> Result<()> {
        let index_path = theme_dir.join(INDEX_FILE);
        fs::write(&index_path, index_theme(theme, sets))
            .io_context(format!("writing index of theme `{}`", theme.name), &index_path)?;

        let cursor_theme_path = theme_dir.join(CURSOR_THEME_FILE);
        fs::write(&cursor_theme_path, cursor_theme(theme)).io_context(
            format!("writing cursor.theme of theme `{}`", theme.name),
            &cursor_theme_path,
        )?;
        Ok(())
    }
}

fn size_limit_error(cursor: &str, size: u32) -> BuildError {
    BuildError::encode(
        cursor,
        Format::Xcursor,
        format!("size {} exceeds the Xcursor limit of {}", size, MAX_IMAGE_SIZE),
    )
}

fn icon_theme_header(theme: &Theme) -> String {
    let mut out = String::new();
    out.push_str("[Icon Theme]\n");
    let _ = writeln!(out, "Name={}", theme.name);
    let _ = writeln!(out, "Comment={}", theme.comment);
    if let Some(inherits) = &theme.inherits {
        let _ = writeln!(out, "Inherits={}", inherits);
    }
    out
}

pub fn index_theme(theme: &Theme, sets: &[SizeSet]) -> String {
    let mut out = icon_theme_header(theme);
    out.push_str("Directories=cursors\n\n");
    out.push_str("[cursors]\nContext=Cursors\nType=Fixed\n\n");
    out.push_str("[X-Cursor Aliases]\n");
    for set in sets {
        let _ = write!(out, "{}=", set.name);
        for alias in &set.aliases {
            let _ = write!(out, "{};", alias);
        }
        out.push('\n');
    }
    out
}

pub fn cursor_theme(theme: &Theme) -> String {
    icon_theme_header(theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Hotspot, ResizeAlgorithm};
    use crate::pipeline::size_set::SizeEntry;
    use image::{Rgba, RgbaImage};
    use std::sync::Arc;

    fn solid(size: u32) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_pixel(size, size, Rgba([10, 20, 30, 255])))
    }

    fn size_set(sizes: &[u32], frames: usize) -> SizeSet {
        SizeSet {
            name: "wait".to_string(),
            aliases: vec!["watch".to_string()],
            hotspot: Hotspot::new(0.5, 0.5),
            delay_ms: Some(40),
            resize: ResizeAlgorithm::None,
            sources: (0..frames)
                .map(|i| crate::pipeline::size_set::FrameSource {
                    path: PathBuf::from(format!("wait-{}.svg", i)),
                    svg: Arc::from(""),
                })
                .collect(),
            entries: sizes
                .iter()
                .map(|&size| SizeEntry {
                    size,
                    hotspot: Hotspot::new(0.5, 0.5).to_pixels(size),
                    frames: (0..frames).map(|_| solid(size)).collect(),
                })
                .collect(),
        }
    }

    fn theme() -> Theme {
        Theme {
            name: "Test".to_string(),
            comment: "Test cursors".to_string(),
            inherits: Some("hicolor".to_string()),
            version: "0.1".to_string(),
            colors: vec![],
            cursors: vec![],
        }
    }

    #[test]
    fn test_encode_round_trip() {
        let set = size_set(&[24, 32], 2);
        let encoded = XcursorEncoder.encode(&set).unwrap();
        let EncodedCursor::Xcursor { data, aliases, .. } = encoded else {
            panic!("expected an Xcursor artifact");
        };
        assert_eq!(aliases, vec!["watch"]);

        let file = XcursorFile::from_bytes(&data).unwrap();
        assert_eq!(file.sizes(), vec![24, 32]);
        assert_eq!(file.images.len(), 4);
        let first = &file.images[0];
        assert_eq!(first.size, 24);
        assert_eq!((first.xhot, first.yhot), (12, 12));
        assert_eq!(first.delay, 40);
        assert_eq!(first.pixels.get_pixel(3, 3), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_static_cursor_has_no_delay() {
        let mut set = size_set(&[16], 1);
        set.delay_ms = Some(40);
        let EncodedCursor::Xcursor { data, .. } = XcursorEncoder.encode(&set).unwrap() else {
            panic!("expected an Xcursor artifact");
        };
        let file = XcursorFile::from_bytes(&data).unwrap();
        assert_eq!(file.images[0].delay, 0);
    }

    #[test]
    fn test_output_matches_xcursor_crate() {
        let set = size_set(&[16, 24], 1);
        let EncodedCursor::Xcursor { data, .. } = XcursorEncoder.encode(&set).unwrap() else {
            panic!("expected an Xcursor artifact");
        };
        let images = ::xcursor::parser::parse_xcursor(&data).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].size, 16);
        assert_eq!(images[1].size, 24);
        assert_eq!((images[1].xhot, images[1].yhot), (12, 12));
    }

    #[test]
    fn test_rejects_oversized_image() {
        let mut set = size_set(&[16], 1);
        set.entries[0].size = MAX_IMAGE_SIZE + 1;
        let err = XcursorEncoder.encode(&set).unwrap_err();
        assert!(matches!(err, BuildError::Encode { .. }));
        assert!(err.to_string().contains("`wait`"));
    }

    #[test]
    fn test_check_rejects_oversized_theme_sizes() {
        let mut theme = theme();
        theme.cursors.push(crate::model::CursorDefinition {
            name: "default".to_string(),
            frames: vec![PathBuf::from("default.svg")],
            hotspot: Hotspot::new(0.0, 0.0),
            sizes: vec![24, MAX_IMAGE_SIZE + 1],
            delay_ms: None,
            aliases: vec![],
            resize: ResizeAlgorithm::None,
        });

        let err = XcursorEncoder.check(&theme).unwrap_err();
        assert!(matches!(err, BuildError::Encode { format: Format::Xcursor, .. }));
        assert!(err.to_string().contains("32768"));

        theme.cursors[0].sizes = vec![24, MAX_IMAGE_SIZE];
        assert!(XcursorEncoder.check(&theme).is_ok());
    }

    #[test]
    fn test_rejects_mismatched_bitmap() {
        let mut set = size_set(&[16], 1);
        set.entries[0].frames[0] = solid(8);
        assert!(XcursorEncoder.encode(&set).is_err());
    }

    #[test]
    fn test_index_theme_lists_aliases() {
        let index = index_theme(&theme(), &[size_set(&[16], 1)]);
        assert!(index.starts_with("[Icon Theme]\nName=Test\nComment=Test cursors\nInherits=hicolor\n"));
        assert!(index.contains("[X-Cursor Aliases]\nwait=watch;\n"));
        assert!(!cursor_theme(&theme()).contains("X-Cursor"));
    }
}
