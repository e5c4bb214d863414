use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";
pub const API_KEY_VAR: &str = "API_key";

static BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Annotate an image with the objects Cloud Vision finds in it.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Image to analyse (.jpg, .jpeg or .png)
    #[arg(long, default_value = "4.jpeg")]
    pub image: PathBuf,
    /// dotenv-style file holding `API_key`
    #[arg(long, default_value = "API_KEY.env")]
    pub env_file: PathBuf,
    /// Where the annotated copy is written
    #[arg(long, default_value = "result.jpg")]
    pub output: PathBuf,
    /// TrueType/OpenType font used for labels, DejaVu Sans when omitted
    #[arg(long)]
    pub font: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
    /// Request timeout, disabled when omitted
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Do not open the annotated image in a viewer
    #[arg(long)]
    pub no_show: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout: Option<Duration>,
    pub image_path: PathBuf,
    pub output_path: PathBuf,
    pub font_path: Option<PathBuf>,
    pub show: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Config {
        load_env_file(&args.env_file);
        let api_key = match env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
            _ => None,
        };
        Config {
            api_key,
            endpoint: args.endpoint,
            timeout: args.timeout_secs.map(Duration::from_secs),
            image_path: args.image,
            output_path: args.output,
            font_path: args.font.or_else(|| env::var_os("LABEL_FONT").map(PathBuf::from)),
            show: !args.no_show,
        }
    }
}

fn load_env_file(path: &Path) {
    match dotenv::from_path(path) {
        Ok(()) => debug!("loaded credentials from {}", path.display()),
        Err(err) => warn!("could not load {}: {}", path.display(), err),
    }
}

pub fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("cannot read font {}", path.display()))?;
    FontArc::try_from_vec(bytes)
        .with_context(|| format!("cannot parse font {}", path.display()))
}

pub fn bundled_font() -> Result<FontArc> {
    FontArc::try_from_slice(BUNDLED_FONT).context("cannot parse bundled DejaVu Sans")
}

/// The configured label font, falling back to the bundled one.
pub fn label_font(path: Option<&Path>) -> Result<FontArc> {
    if let Some(path) = path {
        match load_font(path) {
            Ok(font) => return Ok(font),
            Err(err) => warn!("{:#}, using bundled font", err),
        }
    }
    bundled_font()
}
