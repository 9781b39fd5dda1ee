// Per-cursor size sets: which sizes to produce and the bitmaps for each

use image::RgbaImage;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{BuildError, IoContext, Result};
use crate::model::{ColorMap, CursorDefinition, Hotspot, ResizeAlgorithm};
use crate::pipeline::raster::{rasterize, recolor};

/// A frame's SVG after colour maps were applied.
#[derive(Debug, Clone)]
pub struct FrameSource {
    pub path: PathBuf,
    pub svg: Arc<str>,
}

#[derive(Debug, Clone)]
pub struct SizeEntry {
    pub size: u32,
    /// Hotspot in pixels of this size's grid.
    pub hotspot: (u32, u32),
    /// One bitmap per frame; frames with the same source share an `Arc`.
    pub frames: Vec<Arc<RgbaImage>>,
}

#[derive(Debug, Clone)]
pub struct SizeSet {
    pub name: String,
    pub aliases: Vec<String>,
    pub hotspot: Hotspot,
    pub delay_ms: Option<u32>,
    pub resize: ResizeAlgorithm,
    pub sources: Vec<FrameSource>,
    pub entries: Vec<SizeEntry>,
}

impl SizeSet {
    pub fn is_animated(&self) -> bool {
        self.sources.len() > 1
    }

    pub fn sizes(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.size).collect()
    }

    /// Delay written for each frame: 0 when static.
    pub fn frame_delay(&self) -> u32 {
        if self.is_animated() {
            self.delay_ms.unwrap_or(0)
        } else {
            0
        }
    }
}

/// Deduplicated sizes in ascending order.
pub fn sizes(def: &CursorDefinition) -> Vec<u32> {
    let mut sizes = def.sizes.clone();
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

/// Reads, recolours and rasterizes every frame of `def` at every size.
pub fn build(def: &CursorDefinition, colors: &[ColorMap]) -> Result<SizeSet> {
    // unique source per path; frames index into it
    let mut unique: Vec<FrameSource> = Vec::new();
    let mut by_path: BTreeMap<&Path, usize> = BTreeMap::new();
    let mut frame_ix = Vec::with_capacity(def.frames.len());

    for path in &def.frames {
        let ix = match by_path.get(path.as_path()) {
            Some(&ix) => ix,
            None => {
                let text = fs::read_to_string(path)
                    .io_context(format!("reading SVG for cursor `{}`", def.name), path)?;
                let svg: Arc<str> = Arc::from(recolor(&text, colors).as_ref());
                unique.push(FrameSource {
                    path: path.clone(),
                    svg,
                });
                by_path.insert(path.as_path(), unique.len() - 1);
                unique.len() - 1
            }
        };
        frame_ix.push(ix);
    }

    let sources: Vec<FrameSource> = frame_ix.iter().map(|&ix| unique[ix].clone()).collect();

    let mut entries = Vec::new();
    for size in sizes(def) {
        let mut rendered: Vec<Option<Arc<RgbaImage>>> = vec![None; unique.len()];
        let mut frames = Vec::with_capacity(frame_ix.len());

        for &ix in &frame_ix {
            let bitmap = match &rendered[ix] {
                Some(bitmap) => Arc::clone(bitmap),
                None => {
                    let source = &unique[ix];
                    let bitmap = rasterize(source.svg.as_bytes(), size)
                        .map(Arc::new)
                        .map_err(|e| BuildError::Raster {
                            cursor: def.name.clone(),
                            frame: source.path.display().to_string(),
                            reason: format!("at {}px: {}", size, e),
                        })?;
                    rendered[ix] = Some(Arc::clone(&bitmap));
                    bitmap
                }
            };
            frames.push(bitmap);
        }

        entries.push(SizeEntry {
            size,
            hotspot: def.hotspot.to_pixels(size),
            frames,
        });
    }

    Ok(SizeSet {
        name: def.name.clone(),
        aliases: def.aliases.clone(),
        hotspot: def.hotspot,
        delay_ms: def.delay_ms,
        resize: def.resize,
        sources,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16">
        <rect width="16" height="16" fill="#00FF00"/>
    </svg>"##;

    fn definition(frames: Vec<PathBuf>, sizes: Vec<u32>) -> CursorDefinition {
        CursorDefinition {
            name: "wait".to_string(),
            frames,
            hotspot: Hotspot::new(0.5, 0.5),
            sizes,
            delay_ms: Some(30),
            aliases: vec!["watch".to_string()],
            resize: ResizeAlgorithm::None,
        }
    }

    #[test]
    fn test_sizes_dedup_and_sort() {
        let def = definition(vec![], vec![32, 16, 16, 48]);
        assert_eq!(sizes(&def), vec![16, 32, 48]);
    }

    #[test]
    fn test_build_projects_hotspot_per_size() {
        let dir = tempdir().unwrap();
        let frame = dir.path().join("wait.svg");
        fs::write(&frame, SVG).unwrap();

        let mut def = definition(vec![frame], vec![32, 24, 24]);
        def.delay_ms = None;
        let set = build(&def, &[]).unwrap();

        assert_eq!(set.sizes(), vec![24, 32]);
        assert_eq!(set.entries[0].hotspot, (12, 12));
        assert_eq!(set.entries[1].hotspot, (16, 16));
        assert_eq!(set.entries[0].frames[0].dimensions(), (24, 24));
        assert!(!set.is_animated());
        assert_eq!(set.frame_delay(), 0);
    }

    #[test]
    fn test_build_reuses_bitmaps_for_repeated_frames() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("wait-1.svg");
        let b = dir.path().join("wait-2.svg");
        fs::write(&a, SVG).unwrap();
        fs::write(&b, SVG.replace("#00FF00", "#FF0000")).unwrap();

        let def = definition(vec![a.clone(), b, a], vec![16]);
        let set = build(&def, &[]).unwrap();

        let frames = &set.entries[0].frames;
        assert_eq!(frames.len(), 3);
        assert!(Arc::ptr_eq(&frames[0], &frames[2]));
        assert!(!Arc::ptr_eq(&frames[0], &frames[1]));
        assert!(set.is_animated());
        assert_eq!(set.frame_delay(), 30);
    }

    #[test]
    fn test_build_applies_colors() {
        let dir = tempdir().unwrap();
        let frame = dir.path().join("wait.svg");
        fs::write(&frame, SVG).unwrap();

        let def = definition(vec![frame], vec![8]);
        let colors = vec![ColorMap {
            from: "#00FF00".to_string(),
            to: "#0000FF".to_string(),
        }];
        let set = build(&def, &colors).unwrap();

        assert!(set.sources[0].svg.contains("#0000FF"));
        assert_eq!(set.entries[0].frames[0].get_pixel(4, 4).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_build_reports_raster_error_with_cursor_name() {
        let dir = tempdir().unwrap();
        let frame = dir.path().join("wait.svg");
        fs::write(&frame, "<svg").unwrap();

        let def = definition(vec![frame], vec![8]);
        let err = build(&def, &[]).unwrap_err();
        assert!(matches!(err, BuildError::Raster { .. }));
        assert!(err.to_string().contains("`wait`"));
    }
}
