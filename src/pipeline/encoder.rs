// Format dispatch shared by the Xcursor and Hyprcursor encoders

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, IoContext, Result};
use crate::model::Theme;
use crate::pipeline::fs_ops;
use crate::pipeline::hyprcursor::{HyprcursorEncoder, META_FILE};
use crate::pipeline::size_set::SizeSet;
use crate::pipeline::xcursor::XcursorEncoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Format {
    Xcursor,
    Hyprcursor,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Xcursor => f.write_str("xcursor"),
            Format::Hyprcursor => f.write_str("hyprcursor"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EncoderOptions {
    /// Ship the SVG sources in Hyprcursor shapes instead of PNGs.
    pub hypr_svg: bool,
}

impl Format {
    pub fn encoder(self, options: EncoderOptions) -> Box<dyn ThemeEncoder> {
        match self {
            Format::Xcursor => Box::new(XcursorEncoder),
            Format::Hyprcursor => Box::new(HyprcursorEncoder::new(options.hypr_svg)),
        }
    }
}

/// The on-disk artifact of one cursor, built in memory before writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedCursor {
    Xcursor {
        name: String,
        aliases: Vec<String>,
        data: Vec<u8>,
    },
    Hyprcursor {
        name: String,
        meta: String,
        files: Vec<(String, Vec<u8>)>,
    },
}

impl EncodedCursor {
    pub fn name(&self) -> &str {
        match self {
            EncodedCursor::Xcursor { name, .. } | EncodedCursor::Hyprcursor { name, .. } => name,
        }
    }

    /// Writes the artifact below `cursors_dir` and returns its main path.
    pub fn write(&self, cursors_dir: &Path) -> Result<PathBuf> {
        match self {
            EncodedCursor::Xcursor {
                name,
                aliases,
                data,
            } => {
                let path = cursors_dir.join(name);
                fs::write(&path, data).io_context(format!("writing cursor `{}`", name), &path)?;
                for alias in aliases {
                    let link = cursors_dir.join(alias);
                    fs_ops::link_alias(name, &link)
                        .io_context(format!("linking alias `{}` of `{}`", alias, name), &link)?;
                }
                Ok(path)
            }
            // write failures surface as Encode errors
            EncodedCursor::Hyprcursor { name, meta, files } => {
                let fail = |path: &Path, e: io::Error| {
                    BuildError::encode(
                        name,
                        Format::Hyprcursor,
                        format!("writing {}: {}", path.display(), e),
                    )
                };

                let dir = cursors_dir.join(name);
                fs::create_dir_all(&dir).map_err(|e| fail(&dir, e))?;
                for (file, bytes) in files {
                    let path = dir.join(file);
                    fs::write(&path, bytes).map_err(|e| fail(&path, e))?;
                }
                let meta_path = dir.join(META_FILE);
                fs::write(&meta_path, meta).map_err(|e| fail(&meta_path, e))?;
                Ok(dir)
            }
        }
    }
}

/// One implementation per [`Format`]. The assembler only talks to this.
pub trait ThemeEncoder: Sync {
    fn format(&self) -> Format;

    /// Directory under the theme dir that holds the per-cursor artifacts.
    fn cursors_dir(&self, theme_dir: &Path) -> PathBuf;

    /// Theme-level files, written last.
    fn index_files(&self, theme_dir: &Path) -> Vec<PathBuf>;

    /// Rejects a theme this format cannot hold, before anything is rasterized.
    fn check(&self, _theme: &Theme) -> Result<()> {
        Ok(())
    }

    fn encode(&self, set: &SizeSet) -> Result<EncodedCursor>;

    fn write_index(&self, theme: &Theme, sets: &[SizeSet], theme_dir: &Path) -> Result<()>;
}
