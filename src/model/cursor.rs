use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Hotspot as a fraction of the image bounds, both axes in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
}

impl Hotspot {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_valid(&self) -> bool {
        let in_range = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        in_range(self.x) && in_range(self.y)
    }

    /// Projects onto the pixel grid of a `size`×`size` image.
    ///
    /// Uses round-half-up and clamps to the last pixel so a hotspot of 1.0
    /// still lands inside the image.
    pub fn to_pixels(&self, size: u32) -> (u32, u32) {
        (project(self.x, size), project(self.y, size))
    }
}

fn project(fraction: f64, size: u32) -> u32 {
    if size == 0 {
        return 0;
    }
    let px = (fraction * size as f64 + 0.5).floor();
    (px.max(0.0) as u32).min(size - 1)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeAlgorithm {
    #[default]
    None,
    Bilinear,
    Nearest,
}

impl fmt::Display for ResizeAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResizeAlgorithm::None => "none",
            ResizeAlgorithm::Bilinear => "bilinear",
            ResizeAlgorithm::Nearest => "nearest",
        };
        f.write_str(s)
    }
}

impl FromStr for ResizeAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ResizeAlgorithm::None),
            "bilinear" => Ok(ResizeAlgorithm::Bilinear),
            "nearest" => Ok(ResizeAlgorithm::Nearest),
            other => Err(format!("unknown resize algorithm `{}`", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CursorDefinition {
    pub name: String,
    /// Resolved SVG paths, one per animation frame.
    pub frames: Vec<PathBuf>,
    pub hotspot: Hotspot,
    /// As configured: may be unsorted and contain duplicates.
    pub sizes: Vec<u32>,
    /// Only set for animated cursors.
    pub delay_ms: Option<u32>,
    pub aliases: Vec<String>,
    pub resize: ResizeAlgorithm,
}

impl CursorDefinition {
    pub fn info(&self) -> String {
        format!(
            "{} ({} frame(s), sizes {:?}, aliases {:?})",
            self.name,
            self.frames.len(),
            self.sizes,
            self.aliases
        )
    }
}
