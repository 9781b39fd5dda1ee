use std::path::PathBuf;

use crate::pipeline::encoder::{EncoderOptions, Format};

/// Resolved settings of one build run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildConfig {
    pub config_dir: PathBuf,
    pub svg_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Output formats, deduplicated, in Xcursor then Hyprcursor order.
    pub formats: Vec<Format>,
    /// Theme names to build; empty builds all of them.
    pub themes: Vec<String>,
    /// Worker threads; 0 means one per core.
    pub thread_count: usize,
    pub hypr_svg: bool,
    pub compile: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("config"),
            svg_dir: PathBuf::from("svg"),
            out_dir: PathBuf::from("./out"),
            formats: Vec::new(),
            themes: Vec::new(),
            thread_count: 0,
            hypr_svg: false,
            compile: false,
        }
    }
}

impl BuildConfig {
    pub fn encoder_options(&self) -> EncoderOptions {
        EncoderOptions {
            hypr_svg: self.hypr_svg,
        }
    }
}
