// meta.hl and manifest.hl text formats

use anyhow::{Context, Result, anyhow};
use std::fmt::Write as _;

use crate::model::ResizeAlgorithm;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeImage {
    pub size: u32,
    pub file: String,
    pub delay: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMeta {
    pub resize: ResizeAlgorithm,
    pub hotspot_x: f64,
    pub hotspot_y: f64,
    pub overrides: Vec<String>,
    pub images: Vec<ShapeImage>,
}

impl ShapeMeta {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "resize_algorithm = {}", self.resize);
        let _ = writeln!(out, "hotspot_x = {:.2}", self.hotspot_x);
        let _ = writeln!(out, "hotspot_y = {:.2}", self.hotspot_y);

        if !self.overrides.is_empty() {
            out.push('\n');
            for name in &self.overrides {
                let _ = writeln!(out, "define_override = {}", name);
            }
        }

        if !self.images.is_empty() {
            out.push('\n');
            for img in &self.images {
                match img.delay {
                    Some(delay) => {
                        let _ = writeln!(out, "define_size = {}, {}, {}", img.size, img.file, delay);
                    }
                    None => {
                        let _ = writeln!(out, "define_size = {}, {}", img.size, img.file);
                    }
                }
            }
        }

        out
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut meta = ShapeMeta {
            resize: ResizeAlgorithm::None,
            hotspot_x: 0.0,
            hotspot_y: 0.0,
            overrides: Vec::new(),
            images: Vec::new(),
        };

        for (key, val, line_no) in key_values(content) {
            let ctx = || format!("meta.hl line {}", line_no);
            match key {
                "resize_algorithm" => {
                    meta.resize = val
                        .parse()
                        .map_err(|e: String| anyhow!("{} on line {}", e, line_no))?
                }
                "hotspot_x" => meta.hotspot_x = val.parse().with_context(ctx)?,
                "hotspot_y" => meta.hotspot_y = val.parse().with_context(ctx)?,
                "define_override" => meta.overrides.push(val.to_string()),
                "define_size" => {
                    let parts: Vec<&str> = val.split(',').map(|s| s.trim()).collect();
                    let (size, file, delay) = match parts.as_slice() {
                        [size, file] => (size, file, None),
                        [size, file, delay] => (size, file, Some(delay.parse().with_context(ctx)?)),
                        _ => return Err(anyhow!("malformed define_size `{}` on line {}", val, line_no)),
                    };
                    meta.images.push(ShapeImage {
                        size: size.parse().with_context(ctx)?,
                        file: file.to_string(),
                        delay,
                    });
                }
                _ => {}
            }
        }

        Ok(meta)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub description: String,
    pub version: String,
    pub cursors_directory: String,
}

impl Manifest {
    pub fn render(&self) -> String {
        format!(
            "name = {}\ndescription = {}\nversion = {}\ncursors_directory = {}\n",
            self.name, self.description, self.version, self.cursors_directory
        )
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut manifest = Manifest {
            name: String::new(),
            description: String::new(),
            version: String::new(),
            cursors_directory: String::new(),
        };

        for (key, val, _) in key_values(content) {
            match key {
                "name" => manifest.name = val.to_string(),
                "description" => manifest.description = val.to_string(),
                "version" => manifest.version = val.to_string(),
                "cursors_directory" => manifest.cursors_directory = val.to_string(),
                _ => {}
            }
        }

        if manifest.name.is_empty() {
            return Err(anyhow!("manifest has no name"));
        }
        if manifest.cursors_directory.is_empty() {
            return Err(anyhow!("manifest has no cursors_directory"));
        }
        Ok(manifest)
    }
}

/// `key = value` pairs, skipping blanks and `#` comments.
fn key_values(content: &str) -> impl Iterator<Item = (&str, &str, usize)> {
    content.lines().enumerate().filter_map(|(i, line)| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, val) = line.split_once('=')?;
        Some((key.trim(), val.trim(), i + 1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_static_shape() {
        let meta = ShapeMeta {
            resize: ResizeAlgorithm::Bilinear,
            hotspot_x: 0.207,
            hotspot_y: 0.0,
            overrides: vec!["default".to_string(), "arrow".to_string()],
            images: vec![
                ShapeImage {
                    size: 24,
                    file: "left_ptr_24.png".to_string(),
                    delay: None,
                },
                ShapeImage {
                    size: 32,
                    file: "left_ptr_32.png".to_string(),
                    delay: None,
                },
            ],
        };

        assert_eq!(
            meta.render(),
            "resize_algorithm = bilinear\n\
             hotspot_x = 0.21\n\
             hotspot_y = 0.00\n\
             \n\
             define_override = default\n\
             define_override = arrow\n\
             \n\
             define_size = 24, left_ptr_24.png\n\
             define_size = 32, left_ptr_32.png\n"
        );
    }

    #[test]
    fn test_parse_animated_shape() {
        let meta = ShapeMeta::parse(
            "# generated\n\
             resize_algorithm = none\n\
             hotspot_x = 0.50\n\
             hotspot_y = 0.50\n\
             define_size = 24, wait_24_00.png, 30\n\
             define_size = 24, wait_24_01.png, 30\n",
        )
        .unwrap();

        assert_eq!(meta.hotspot_x, 0.5);
        assert_eq!(meta.images.len(), 2);
        assert_eq!(meta.images[1].file, "wait_24_01.png");
        assert_eq!(meta.images[1].delay, Some(30));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(ShapeMeta::parse("hotspot_x = left\n").is_err());
        assert!(ShapeMeta::parse("resize_algorithm = cubic\n").is_err());
        assert!(ShapeMeta::parse("define_size = 24\n").is_err());
    }

    #[test]
    fn test_manifest_round_trip() {
        let manifest = Manifest {
            name: "Test".to_string(),
            description: "Test cursors".to_string(),
            version: "0.1".to_string(),
            cursors_directory: "hyprcursors".to_string(),
        };
        assert_eq!(Manifest::parse(&manifest.render()).unwrap(), manifest);
        assert!(Manifest::parse("version = 1\n").is_err());
    }
}
