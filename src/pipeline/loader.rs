// Theme and cursor metadata loading from build.toml

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{BuildError, IoContext, Result};
use crate::logger::Logger;
use crate::model::{ColorMap, CursorDefinition, Hotspot, ResizeAlgorithm, Theme};

pub const CONFIG_FILE: &str = "build.toml";
pub const DEFAULT_FRAME_DELAY_MS: u32 = 30;
const DISCOVERY_DEPTH: usize = 8;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBuild {
    #[serde(default)]
    defaults: RawDefaults,
    #[serde(default, rename = "theme")]
    themes: Vec<RawTheme>,
    #[serde(default, rename = "cursor")]
    cursors: Vec<RawCursor>,
    /// Named alternatives to `[[cursor]]`, selected per theme.
    #[serde(default, rename = "cursor-set")]
    cursor_sets: BTreeMap<String, Vec<RawCursor>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawDefaults {
    sizes: Option<Vec<i64>>,
    hotspot: Option<[f64; 2]>,
    delay_ms: Option<i64>,
    resize: Option<ResizeAlgorithm>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawTheme {
    name: String,
    comment: Option<String>,
    inherits: Option<String>,
    version: Option<String>,
    svg_dir: Option<PathBuf>,
    #[serde(default)]
    colors: Vec<ColorMap>,
    /// Name of a `[[cursor-set.<name>]]` list replacing `[[cursor]]`.
    cursors: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawCursor {
    name: String,
    frames: Option<Vec<PathBuf>>,
    hotspot: Option<[f64; 2]>,
    sizes: Option<Vec<i64>>,
    delay_ms: Option<i64>,
    #[serde(default)]
    aliases: Vec<String>,
    resize: Option<ResizeAlgorithm>,
}

/// Loads the themes described by `<config_dir>/build.toml`.
///
/// Only themes named in `select` are resolved; an empty `select` resolves
/// all of them. Frame paths are resolved against `svg_dir` (or the theme's `svg-dir`
/// below it) and must exist.
pub fn load(
    config_dir: &Path,
    svg_dir: &Path,
    select: &[String],
    logger: &Logger,
) -> Result<Vec<Theme>> {
    let path = config_dir.join(CONFIG_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(BuildError::config(
                path.display().to_string(),
                CONFIG_FILE,
                "not found",
            ));
        }
        Err(e) => return Err(e).io_context("reading build config", &path),
    };

    logger.debug(format!("Loading {}", path.display()));
    parse(&content, &path.display().to_string(), svg_dir, select, logger)
}

pub fn parse(
    content: &str,
    origin: &str,
    svg_dir: &Path,
    select: &[String],
    logger: &Logger,
) -> Result<Vec<Theme>> {
    let raw: RawBuild = toml::from_str(content)
        .map_err(|e| BuildError::config(origin, "syntax", e.to_string().trim().to_string()))?;

    if raw.themes.is_empty() {
        return Err(BuildError::config(origin, "theme", "at least one [[theme]] is required"));
    }

    check_unique_names(&raw.cursors)?;
    for set in raw.cursor_sets.values() {
        check_unique_names(set)?;
    }
    check_theme_names(&raw.themes)?;

    for wanted in select {
        if !raw.themes.iter().any(|t| &t.name == wanted) {
            return Err(BuildError::config(
                origin,
                "theme",
                format!("`{}` is not defined", wanted),
            ));
        }
    }

    let selected = raw
        .themes
        .iter()
        .filter(|t| select.is_empty() || select.contains(&t.name));
    let mut themes = Vec::with_capacity(raw.themes.len());

    for raw_theme in selected {
        let entry = format!("theme `{}`", raw_theme.name);

        let raw_cursors = match &raw_theme.cursors {
            None => &raw.cursors,
            Some(set) => raw.cursor_sets.get(set).ok_or_else(|| {
                BuildError::config(&entry, "cursors", format!("unknown cursor set `{}`", set))
            })?,
        };
        if raw_cursors.is_empty() {
            let reason = match &raw_theme.cursors {
                None => "at least one [[cursor]] is required".to_string(),
                Some(set) => format!("cursor set `{}` is empty", set),
            };
            return Err(BuildError::config(&entry, "cursors", reason));
        }

        let theme_svg_dir = match &raw_theme.svg_dir {
            Some(sub) => svg_dir.join(sub),
            None => svg_dir.to_path_buf(),
        };
        if !theme_svg_dir.is_dir() {
            return Err(BuildError::config(
                entry,
                "svg-dir",
                format!("{} is not a directory", theme_svg_dir.display()),
            ));
        }

        for (i, map) in raw_theme.colors.iter().enumerate() {
            if map.from.is_empty() {
                return Err(BuildError::config(
                    entry,
                    "colors",
                    format!("entry {} has an empty `match`", i),
                ));
            }
        }

        let mut cursors = Vec::with_capacity(raw_cursors.len());
        for raw_cursor in raw_cursors {
            let def = resolve_cursor(raw_cursor, &raw.defaults, &theme_svg_dir, logger)?;
            logger.debug(format!("{}: {}", raw_theme.name, def.info()));
            cursors.push(def);
        }

        themes.push(Theme {
            name: raw_theme.name.clone(),
            comment: raw_theme
                .comment
                .clone()
                .unwrap_or_else(|| format!("{} cursor theme", raw_theme.name)),
            inherits: raw_theme.inherits.clone(),
            version: raw_theme.version.clone().unwrap_or_else(|| "0.1".to_string()),
            colors: raw_theme.colors.clone(),
            cursors,
        });
    }

    Ok(themes)
}

/// Theme names must be distinct and must not collide with the
/// `theme_<name>` directory the compile step writes for another theme.
fn check_theme_names(themes: &[RawTheme]) -> Result<()> {
    let mut names = BTreeSet::new();
    for theme in themes {
        let entry = format!("theme `{}`", theme.name);
        validate_theme_name(&theme.name, &entry)?;
        if !names.insert(theme.name.as_str()) {
            return Err(BuildError::config(entry, "name", "is defined more than once"));
        }
    }

    for theme in themes {
        let compiled = compiled_dir_name(&theme.name);
        if names.contains(compiled.as_str()) {
            return Err(BuildError::config(
                format!("theme `{}`", compiled),
                "name",
                format!("collides with the compiled output of theme `{}`", theme.name),
            ));
        }
    }
    Ok(())
}

/// Directory name of a compiled Hyprcursor theme.
pub fn compiled_dir_name(theme: &str) -> String {
    format!("theme_{}", theme.replace(' ', "_"))
}

fn check_unique_names(cursors: &[RawCursor]) -> Result<()> {
    let cursor_names: BTreeSet<&str> = cursors.iter().map(|c| c.name.as_str()).collect();
    let mut seen = BTreeSet::new();

    for cursor in cursors {
        let entry = format!("cursor `{}`", cursor.name);
        validate_shape_name(&cursor.name, &entry, "name")?;
        if !seen.insert(cursor.name.as_str()) {
            return Err(BuildError::config(entry, "name", "is defined more than once"));
        }
    }

    for cursor in cursors {
        let entry = format!("cursor `{}`", cursor.name);
        for alias in &cursor.aliases {
            validate_shape_name(alias, &entry, "aliases")?;
            if cursor_names.contains(alias.as_str()) {
                return Err(BuildError::config(
                    entry,
                    "aliases",
                    format!("`{}` is already a cursor name", alias),
                ));
            }
            if !seen.insert(alias.as_str()) {
                return Err(BuildError::config(
                    entry,
                    "aliases",
                    format!("`{}` is used more than once", alias),
                ));
            }
        }
    }

    Ok(())
}

fn validate_shape_name(name: &str, entry: &str, field: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BuildError::config(entry, field, "must not be empty"));
    }
    if name == "." || name == ".." {
        return Err(BuildError::config(entry, field, format!("`{}` is not a valid name", name)));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(BuildError::config(
            entry,
            field,
            format!("`{}` may only contain alphanumerics, `_`, `-` and `.`", name),
        ));
    }
    Ok(())
}

fn validate_theme_name(name: &str, entry: &str) -> Result<()> {
    if name.trim().is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(BuildError::config(entry, "name", "is not usable as a directory name"));
    }
    Ok(())
}

fn resolve_cursor(
    raw: &RawCursor,
    defaults: &RawDefaults,
    svg_dir: &Path,
    logger: &Logger,
) -> Result<CursorDefinition> {
    let entry = format!("cursor `{}`", raw.name);

    let sizes = raw
        .sizes
        .as_ref()
        .or(defaults.sizes.as_ref())
        .ok_or_else(|| BuildError::config(&entry, "sizes", "is missing (and no default is set)"))?;
    let sizes = validate_sizes(sizes, &entry)?;

    let [hx, hy] = raw
        .hotspot
        .or(defaults.hotspot)
        .ok_or_else(|| BuildError::config(&entry, "hotspot", "is missing (and no default is set)"))?;
    let hotspot = Hotspot::new(hx, hy);
    if !hotspot.is_valid() {
        return Err(BuildError::config(
            &entry,
            "hotspot",
            format!("[{}, {}] is outside [0, 1]", hx, hy),
        ));
    }

    let frames = match &raw.frames {
        Some(frames) => {
            if frames.is_empty() {
                return Err(BuildError::config(&entry, "frames", "must not be empty"));
            }
            let mut resolved = Vec::with_capacity(frames.len());
            for frame in frames {
                let path = svg_dir.join(frame);
                if !path.is_file() {
                    return Err(BuildError::config(
                        &entry,
                        "frames",
                        format!("{} does not exist", path.display()),
                    ));
                }
                resolved.push(path);
            }
            resolved
        }
        None => {
            let found = discover_frames(svg_dir, &raw.name);
            if found.is_empty() {
                return Err(BuildError::config(
                    &entry,
                    "frames",
                    format!("no SVG named `{}` found under {}", raw.name, svg_dir.display()),
                ));
            }
            found
        }
    };

    let delay = raw.delay_ms.or(defaults.delay_ms);
    let delay_ms = if frames.len() > 1 {
        match delay {
            Some(ms) if ms <= 0 || ms > u32::MAX as i64 => {
                return Err(BuildError::config(
                    &entry,
                    "delay-ms",
                    format!("{} is not a positive number of milliseconds", ms),
                ));
            }
            Some(ms) => Some(ms as u32),
            None => Some(DEFAULT_FRAME_DELAY_MS),
        }
    } else {
        if raw.delay_ms.is_some() {
            logger.warn(format!("{}: delay-ms ignored for a static cursor", entry));
        }
        None
    };

    Ok(CursorDefinition {
        name: raw.name.clone(),
        frames,
        hotspot,
        sizes,
        delay_ms,
        aliases: raw.aliases.clone(),
        resize: raw.resize.or(defaults.resize).unwrap_or_default(),
    })
}

fn validate_sizes(sizes: &[i64], entry: &str) -> Result<Vec<u32>> {
    if sizes.is_empty() {
        return Err(BuildError::config(entry, "sizes", "must not be empty"));
    }
    sizes
        .iter()
        .map(|&s| {
            if s <= 0 || s > u32::MAX as i64 {
                Err(BuildError::config(
                    entry,
                    "sizes",
                    format!("{} is not a positive pixel size", s),
                ))
            } else {
                Ok(s as u32)
            }
        })
        .collect()
}

/// Finds `<name>.svg`, `<name>_NN.svg` or `<name>-NN.svg` under `dir`,
/// ordered by frame number.
pub fn discover_frames(dir: &Path, name: &str) -> Vec<PathBuf> {
    let mut found: Vec<(Option<u64>, PathBuf)> = WalkDir::new(dir)
        .max_depth(DISCOVERY_DEPTH)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let path = e.path();
            let is_svg = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("svg"))
                .unwrap_or(false);
            if !is_svg {
                return None;
            }
            let stem = path.file_stem()?.to_str()?;
            frame_number(stem, name).map(|n| (n, path.to_path_buf()))
        })
        .collect();

    found.sort();
    found.into_iter().map(|(_, path)| path).collect()
}

/// `Some(None)` for an exact match, `Some(Some(n))` for a numbered frame.
fn frame_number(stem: &str, name: &str) -> Option<Option<u64>> {
    let rest = stem.strip_prefix(name)?;
    if rest.is_empty() {
        return Some(None);
    }
    let digits = rest.strip_prefix(['_', '-'])?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(Some)
}
