// Theme assembly: size sets for every cursor, then one output tree per format

use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, IoContext, Result};
use crate::logger::Logger;
use crate::model::Theme;
use crate::pipeline::encoder::ThemeEncoder;
use crate::pipeline::fs_ops;
use crate::pipeline::size_set::{self, SizeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub theme_dir: PathBuf,
    /// Cursor names in configuration order.
    pub cursors: Vec<String>,
}

/// Rasterizes every cursor of `theme`. The result keeps configuration order.
pub fn build_size_sets(theme: &Theme, logger: &Logger) -> Result<Vec<SizeSet>> {
    logger.info(format!(
        "Rasterizing {} cursors of theme `{}`",
        theme.cursors.len(),
        theme.name
    ));

    theme
        .cursors
        .par_iter()
        .map(|def| {
            logger.debug(format!("Rasterizing {}", def.info()));
            size_set::build(def, &theme.colors)
        })
        .collect()
}

/// Writes `<out_dir>/<theme>/` for the encoder's format.
///
/// The cursor directory is recreated from empty and the index is written
/// only after every cursor was written.
pub fn assemble(
    theme: &Theme,
    sets: &[SizeSet],
    encoder: &dyn ThemeEncoder,
    out_dir: &Path,
    logger: &Logger,
) -> Result<Assembled> {
    let format = encoder.format();

    fs_ops::ensure_dir(out_dir).io_context("preparing output dir", out_dir)?;
    let theme_dir = out_dir.join(&theme.name);
    fs_ops::ensure_dir(&theme_dir).io_context("preparing theme dir", &theme_dir)?;

    for index in encoder.index_files(&theme_dir) {
        fs_ops::remove_file_if_exists(&index).io_context("removing old index", &index)?;
    }
    let cursors_dir = encoder.cursors_dir(&theme_dir);
    fs_ops::reset_dir(&cursors_dir).io_context("preparing cursor dir", &cursors_dir)?;

    logger.info(format!(
        "Writing {} theme `{}` to {}",
        format,
        theme.name,
        theme_dir.display()
    ));

    let cursors = sets
        .par_iter()
        .map(|set| -> Result<String> {
            let encoded = encoder.encode(set)?;
            let path = encoded.write(&cursors_dir)?;
            logger.debug(format!("Wrote {}", path.display()));
            Ok(encoded.name().to_string())
        })
        .collect::<Result<Vec<_>>>()?;

    encoder.write_index(theme, sets, &theme_dir)?;

    Ok(Assembled { theme_dir, cursors })
}

/// Fails early when `out_dir` cannot hold a theme directory.
pub fn check_out_dir(out_dir: &Path) -> Result<()> {
    if out_dir.exists() && !out_dir.is_dir() {
        return Err(BuildError::Io {
            context: "output path is not a directory".to_string(),
            path: out_dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "not a directory"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CursorDefinition, Hotspot, ResizeAlgorithm};
    use crate::pipeline::xcursor::XcursorEncoder;
    use std::fs;
    use tempfile::tempdir;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><rect width="8" height="8"/></svg>"#;

    fn theme(dir: &Path, names: &[&str]) -> Theme {
        let cursors = names
            .iter()
            .map(|name| {
                let frame = dir.join(format!("{}.svg", name));
                fs::write(&frame, SVG).unwrap();
                CursorDefinition {
                    name: name.to_string(),
                    frames: vec![frame],
                    hotspot: Hotspot::new(0.0, 0.0),
                    sizes: vec![8],
                    delay_ms: None,
                    aliases: vec![],
                    resize: ResizeAlgorithm::None,
                }
            })
            .collect();
        Theme {
            name: "Test".to_string(),
            comment: "Test cursors".to_string(),
            inherits: None,
            version: "0.1".to_string(),
            colors: vec![],
            cursors,
        }
    }

    #[test]
    fn test_assemble_keeps_config_order() {
        let dir = tempdir().unwrap();
        let names = ["xterm", "default", "pointer", "wait", "crosshair"];
        let theme = theme(dir.path(), &names);

        let sets = build_size_sets(&theme, &Logger::silent()).unwrap();
        let out = dir.path().join("out");
        let assembled = assemble(&theme, &sets, &XcursorEncoder, &out, &Logger::silent()).unwrap();

        assert_eq!(assembled.theme_dir, out.join("Test"));
        assert_eq!(assembled.cursors, names);
        let index = fs::read_to_string(out.join("Test/index.theme")).unwrap();
        let listed: Vec<&str> = index
            .lines()
            .skip_while(|l| *l != "[X-Cursor Aliases]")
            .skip(1)
            .map(|l| l.trim_end_matches('='))
            .collect();
        assert_eq!(listed, names);
    }

    #[test]
    fn test_rejects_file_as_out_dir() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("out");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(check_out_dir(&file), Err(BuildError::Io { .. })));
        assert!(check_out_dir(&dir.path().join("missing")).is_ok());
    }
}
