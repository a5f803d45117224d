//! Command-line arguments. Values given here override `options.ron`.

use std::path::PathBuf;

use clap::Parser;

use crate::options::AppOptions;

#[derive(Parser, Debug, Default)]
#[command(name = "orbital-view", about = "Interactive Earth viewer with an AI planetary guide")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<f32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<f32>,

    /// Chat model id.
    #[arg(long)]
    pub model: Option<String>,

    /// Texture directory.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Never download missing textures.
    #[arg(long)]
    pub offline: bool,

    /// Log filter (error, warn, info, debug, trace or a full directive).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory for the JSON log file in debug builds.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Options directory (overrides the platform default).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl AppOptions {
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref model) = args.model {
            self.chat.model = model.clone();
        }
        if let Some(ref dir) = args.assets {
            self.assets.dir = dir.clone();
        }
        if args.offline {
            self.assets.download_missing = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref dir) = args.log_dir {
            self.debug.log_dir = Some(dir.clone());
        }
    }
}
