use std::fs;
use std::io;
use std::path::Path;

pub fn ensure_dir<P: AsRef<Path>>(p: P) -> io::Result<()> {
    let p = p.as_ref();
    if p.exists() && !p.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "path exists and is not a directory",
        ));
    }
    if !p.exists() {
        fs::create_dir_all(p)?;
    }
    Ok(())
}

/// Replaces `p` with an empty directory.
pub fn reset_dir<P: AsRef<Path>>(p: P) -> io::Result<()> {
    let p = p.as_ref();
    match fs::symlink_metadata(p) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(p)?,
        Ok(_) => fs::remove_file(p)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::create_dir_all(p)
}

pub fn remove_file_if_exists<P: AsRef<Path>>(p: P) -> io::Result<()> {
    match fs::remove_file(p) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Makes `link` resolve to the sibling file named `target`.
#[cfg(unix)]
pub fn link_alias(target: &str, link: &Path) -> io::Result<()> {
    remove_file_if_exists(link)?;
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
pub fn link_alias(target: &str, link: &Path) -> io::Result<()> {
    remove_file_if_exists(link)?;
    let dir = link.parent().unwrap_or_else(|| Path::new("."));
    fs::copy(dir.join(target), link).map(|_| ())
}
