//! Command-line interface and the build driver behind it.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::config::BuildConfig;
use crate::logger::{LogLevel, Logger};
use crate::pipeline::encoder::{Format, ThemeEncoder};
use crate::pipeline::hyprcursor::compile_theme;
use crate::pipeline::{assembler, loader};

/// Build Xcursor and Hyprcursor themes from SVG artwork
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("format").required(true).multiple(true).args(["hypr", "x11"])))]
pub struct Cli {
    /// Build the Hyprcursor theme
    #[arg(long)]
    pub hypr: bool,

    /// Build the Xcursor theme
    #[arg(long)]
    pub x11: bool,

    /// Minimum level of log lines written to stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Directory receiving one sub-directory per theme
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub out_dir: PathBuf,

    /// Directory holding build.toml
    #[arg(long, default_value = "config", value_hint = clap::ValueHint::DirPath)]
    pub config_dir: PathBuf,

    /// Root of the SVG artwork
    #[arg(long, default_value = "svg", value_hint = clap::ValueHint::DirPath)]
    pub svg_dir: PathBuf,

    /// Only build the named theme (repeatable)
    #[arg(long = "theme", value_name = "NAME")]
    pub themes: Vec<String>,

    /// Worker threads (0 = one per core)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Ship SVG sources in Hyprcursor shapes instead of PNGs
    #[arg(long, requires = "hypr")]
    pub hypr_svg: bool,

    /// Also compile the Hyprcursor theme into .hlc shapes
    #[arg(long, requires = "hypr")]
    pub compile: bool,
}

impl Cli {
    pub fn into_config(self) -> BuildConfig {
        let mut formats = Vec::new();
        if self.x11 {
            formats.push(Format::Xcursor);
        }
        if self.hypr {
            formats.push(Format::Hyprcursor);
        }

        BuildConfig {
            config_dir: self.config_dir,
            svg_dir: self.svg_dir,
            out_dir: self.out_dir,
            formats,
            themes: self.themes,
            thread_count: self.jobs,
            hypr_svg: self.hypr_svg,
            compile: self.compile,
        }
    }
}

/// Exit status for a failed parse: 0 for `--help`/`--version`, 1 otherwise.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    use clap::error::ErrorKind;
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Runs a full build. Every selected theme is built for every format.
pub fn run(config: &BuildConfig, logger: &Logger) -> Result<()> {
    assembler::check_out_dir(&config.out_dir)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.thread_count)
        .build()
        .context("failed to start worker threads")?;

    let themes = loader::load(&config.config_dir, &config.svg_dir, &config.themes, logger)?;
    let encoders: Vec<Box<dyn ThemeEncoder>> = config
        .formats
        .iter()
        .map(|format| format.encoder(config.encoder_options()))
        .collect();

    pool.install(|| -> Result<()> {
        for theme in &themes {
            for encoder in &encoders {
                encoder.check(theme).with_context(|| {
                    format!("checking {} theme `{}`", encoder.format(), theme.name)
                })?;
            }

            let sets = assembler::build_size_sets(theme, logger)
                .with_context(|| format!("building theme `{}`", theme.name))?;

            for encoder in &encoders {
                let format = encoder.format();
                let assembled =
                    assembler::assemble(theme, &sets, encoder.as_ref(), &config.out_dir, logger)
                        .with_context(|| format!("writing {} theme `{}`", format, theme.name))?;
                logger.info(format!(
                    "Wrote {} {} cursors to {}",
                    assembled.cursors.len(),
                    format,
                    assembled.theme_dir.display()
                ));

                if format == Format::Hyprcursor && config.compile {
                    compile_theme(&assembled.theme_dir, &config.out_dir, logger)
                        .with_context(|| format!("compiling theme `{}`", theme.name))?;
                }
            }
        }
        Ok(())
    })?;

    logger.info("Done");
    Ok(())
}
