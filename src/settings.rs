use std::path::Path;
use std::time::Duration;

use sitereport_lib::{Config, ReportError, Viewport};

/// Tracks which CLI flags were explicitly provided vs. defaulted.
#[derive(Debug, Default)]
pub struct FlagSources {
    pub viewport: bool,
    pub nav_timeout: bool,
    pub poll_interval: bool,
    pub assets_dir: bool,
}

impl FlagSources {
    pub fn from_args(args: &[String]) -> Self {
        Self {
            viewport: flag_present(args, "--viewport"),
            nav_timeout: flag_present(args, "--nav-timeout"),
            poll_interval: flag_present(args, "--poll-interval"),
            assets_dir: flag_present(args, "--assets-dir"),
        }
    }
}

/// Checks if a flag was present in the command-line arguments.
pub fn flag_present(args: &[String], flag: &str) -> bool {
    args.iter()
        .any(|arg| arg == flag || arg.starts_with(&format!("{flag}=")))
}

/// Merge CLI arguments into the loaded config, preferring CLI when the flag
/// was explicitly given.
pub fn resolve_settings(
    cli_viewport: Viewport,
    cli_nav_timeout: u64,
    cli_poll_interval: u64,
    cli_assets_dir: &Path,
    mut config: Config,
    flags: &FlagSources,
) -> Config {
    if flags.viewport {
        config.viewport = cli_viewport;
    }
    if flags.nav_timeout {
        config.timeouts.navigation = Duration::from_secs(cli_nav_timeout);
    }
    if flags.poll_interval {
        config.timeouts.poll_interval = Duration::from_secs(cli_poll_interval);
    }
    if flags.assets_dir {
        config.assets_dir = cli_assets_dir.to_path_buf();
    } else if config.assets_dir.as_os_str().is_empty() {
        config.assets_dir = cli_assets_dir.to_path_buf();
    }
    config
}

/// Load config from a TOML file or return defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ReportError> {
    Config::load(path)
}

/// Log effective settings to stderr (verbose mode).
pub fn log_effective_config(config_path: Option<&Path>, config: &Config) {
    let config_source = config_path
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "defaults/built-in".to_string());
    eprintln!(
        "config: source={} viewport={}x{} nav_timeout={:?} poll_interval={:?} assets_dir={}",
        config_source,
        config.viewport.width,
        config.viewport.height,
        config.timeouts.navigation,
        config.timeouts.poll_interval,
        config.assets_dir.display(),
    );
}
