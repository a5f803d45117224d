//! Tracing subscriber setup.
//!
//! Console output with uptime timestamps, plus a JSON log file in debug
//! builds when a log directory is configured. `RUST_LOG` wins over the
//! options' log level.

use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::options::AppOptions;

const DEFAULT_FILTER: &str = "info,eframe=warn,egui_glow=warn";
const LOG_FILE: &str = "orbital.log";

fn filter_directive(options: Option<&AppOptions>) -> String {
    match options {
        Some(o) if !o.debug.log_level.trim().is_empty() => {
            format!("{},eframe=warn,egui_glow=warn", o.debug.log_level.trim())
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, options: Option<&AppOptions>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(options)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build {
        if let Some(log_dir) = log_dir {
            let file = std::fs::create_dir_all(log_dir)
                .and_then(|_| std::fs::File::create(log_dir.join(LOG_FILE)));
            if let Ok(file) = file {
                let file_layer = fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(fmt::time::uptime())
                    .json();
                subscriber.with(file_layer).init();
                return;
            }
        }
    }

    subscriber.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_renderer_crates() {
        let s = EnvFilter::new(filter_directive(None)).to_string();
        assert!(s.contains("eframe=warn"));
        assert!(s.contains("egui_glow=warn"));
        assert!(s.contains("info"));
    }

    #[test]
    fn test_options_level_is_used() {
        let mut options = AppOptions::default();
        options.debug.log_level = "debug".to_string();
        let directive = filter_directive(Some(&options));
        assert!(directive.starts_with("debug,"));
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn test_blank_level_falls_back() {
        let mut options = AppOptions::default();
        options.debug.log_level = "  ".to_string();
        assert_eq!(filter_directive(Some(&options)), DEFAULT_FILTER);
        assert_eq!(filter_directive(None), DEFAULT_FILTER);
    }
}
