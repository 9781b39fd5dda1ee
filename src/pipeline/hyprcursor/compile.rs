// Compiled Hyprcursor themes: each shape directory zipped into <shape>.hlc

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::meta::{Manifest, ShapeMeta};
use super::{MANIFEST_FILE, META_FILE};
use crate::error::{BuildError, IoContext, Result};
use crate::logger::Logger;
use crate::pipeline::encoder::Format;
use crate::pipeline::{fs_ops, loader};

/// Compiles the source theme at `theme_dir` into `<out_dir>/theme_<name>`.
pub fn compile_theme(theme_dir: &Path, out_dir: &Path, logger: &Logger) -> Result<PathBuf> {
    let manifest_path = theme_dir.join(MANIFEST_FILE);
    let content = fs::read_to_string(&manifest_path).io_context("reading manifest", &manifest_path)?;
    let manifest = Manifest::parse(&content)
        .map_err(|e| BuildError::encode(MANIFEST_FILE, Format::Hyprcursor, e.to_string()))?;

    logger.info(format!(
        "Compiling {} v{} - {}",
        manifest.name, manifest.version, manifest.description
    ));

    let out_path = out_dir.join(loader::compiled_dir_name(&manifest.name));
    fs_ops::reset_dir(&out_path).io_context("preparing compiled theme dir", &out_path)?;

    let manifest_out = out_path.join(MANIFEST_FILE);
    fs::write(&manifest_out, manifest.render()).io_context("writing manifest", &manifest_out)?;

    let shapes_src = theme_dir.join(&manifest.cursors_directory);
    let shapes_out = out_path.join(&manifest.cursors_directory);
    fs::create_dir_all(&shapes_out).io_context("creating shapes dir", &shapes_out)?;

    let mut shape_dirs: Vec<PathBuf> = fs::read_dir(&shapes_src)
        .io_context("listing shapes", &shapes_src)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    shape_dirs.sort();

    for shape_dir in shape_dirs {
        let Some(name) = shape_dir.file_name().and_then(|n| n.to_str()) else {
            logger.warn(format!("Skipping non UTF-8 shape dir {}", shape_dir.display()));
            continue;
        };
        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            logger.warn(format!("Skipping invalid shape name: {}", name));
            continue;
        }

        compile_shape(&shape_dir, &shapes_out, name)?;
        logger.debug(format!("Created {}.hlc", name));
    }

    logger.info(format!("Compiled theme at {}", out_path.display()));
    Ok(out_path)
}

pub fn compile_shape(shape_dir: &Path, out_dir: &Path, name: &str) -> Result<PathBuf> {
    let fail = |reason: String| BuildError::encode(name, Format::Hyprcursor, reason);

    let meta_path = shape_dir.join(META_FILE);
    let meta_content = fs::read_to_string(&meta_path).io_context("reading shape meta", &meta_path)?;
    let meta = ShapeMeta::parse(&meta_content).map_err(|e| fail(format!("{:#}", e)))?;

    if meta.images.is_empty() {
        return Err(fail("no images defined".to_string()));
    }
    for img in &meta.images {
        if img.size == 0 && !img.file.ends_with(".svg") {
            return Err(fail(format!("image {} has size 0", img.file)));
        }
        if !shape_dir.join(&img.file).is_file() {
            return Err(fail(format!("image {} is missing", img.file)));
        }
    }

    let zip_path = out_dir.join(format!("{}.hlc", name));
    let file = File::create(&zip_path).io_context("creating .hlc", &zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644)
        .last_modified_time(DateTime::default());

    zip.start_file(META_FILE, options)
        .map_err(|e| fail(e.to_string()))?;
    zip.write_all(meta_content.as_bytes())
        .io_context("writing .hlc", &zip_path)?;

    let mut added: Vec<&str> = Vec::new();
    for img in &meta.images {
        if added.contains(&img.file.as_str()) {
            continue;
        }
        let img_path = shape_dir.join(&img.file);
        let bytes = fs::read(&img_path).io_context("reading shape image", &img_path)?;
        zip.start_file(img.file.as_str(), options)
            .map_err(|e| fail(e.to_string()))?;
        zip.write_all(&bytes).io_context("writing .hlc", &zip_path)?;
        added.push(&img.file);
    }

    zip.finish().map_err(|e| fail(e.to_string()))?;
    Ok(zip_path)
}
