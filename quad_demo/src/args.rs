//! Command-line arguments and their mapping onto [`Config`]

use clap::Parser;
use quad_engine::quad::{Config, Error, Payload, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quad_demo", about = "Draws a rotating textured quad (or a triangle) with Vulkan")]
pub struct Args {
    /// Draw the resource-free triangle instead of the textured quad
    #[arg(long)]
    pub triangle: bool,

    /// Force the validation layer on (default: on in debug builds)
    #[arg(long, conflicts_with = "no_validation")]
    pub validation: bool,

    /// Force the validation layer off
    #[arg(long)]
    pub no_validation: bool,

    /// Frames that may be submitted before the CPU waits
    #[arg(long, value_name = "N")]
    pub frames_in_flight: Option<usize>,

    /// Directory holding the compiled SPIR-V shaders
    #[arg(long, value_name = "PATH")]
    pub shader_dir: Option<PathBuf>,

    /// Initial window size
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,
}

impl Args {
    /// Apply the flags over [`Config::default`] and validate the result
    pub fn into_config(self) -> Result<Config> {
        let mut config = Config::default();

        if self.triangle {
            config.payload = Payload::Triangle;
        }
        if self.validation {
            config.enable_validation = true;
        }
        if self.no_validation {
            config.enable_validation = false;
        }
        if let Some(frames) = self.frames_in_flight {
            config.frames_in_flight = frames;
        }
        if let Some(dir) = self.shader_dir {
            config.shader_dir = dir;
        }
        if let Some((width, height)) = self.size {
            config.window_width = width;
            config.window_height = height;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse arguments, reporting clap usage errors as initialization failures
///
/// `--help` prints the usage and exits inside clap.
pub fn config_from_env() -> Result<Config> {
    match Args::try_parse() {
        Ok(args) => args.into_config(),
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => Err(Error::InitializationFailed(e.to_string())),
    }
}

fn parse_size(value: &str) -> std::result::Result<(u32, u32), String> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width = width.parse().map_err(|_| format!("invalid width '{}'", width))?;
    let height = height.parse().map_err(|_| format!("invalid height '{}'", height))?;
    Ok((width, height))
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
