use clap::Parser;
use sitereport_lib::Viewport;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sitereport")]
#[command(
    version,
    about = "Site Report - Produce an annotated image report for a website",
    long_about = "Site Report\n\nDrives a headless browser and a handful of public web services to build a\ndirectory of report images for one target website: registration data (RDAP),\nresponsive preview, performance grade, backlinks, AMP card, and SSL\npresentation. Stages fail independently; a partial report is still a report."
)]
pub struct Cli {
    #[arg(help = "Target website URL; bare hostnames get https:// assumed")]
    pub url: String,

    #[arg(
        long,
        default_value = "report",
        help = "Run name; names the output directory"
    )]
    pub name: String,

    #[arg(
        long,
        value_name = "PATH",
        default_value = ".",
        help = "Base directory the run directory is allocated under"
    )]
    pub output_dir: PathBuf,

    #[arg(
        long,
        help = "Compress the report images via the external optimizer after all stages"
    )]
    pub optimize: bool,

    #[arg(
        long,
        value_name = "PATH",
        default_value = "assets",
        help = "Directory holding the report templates and fonts"
    )]
    pub assets_dir: PathBuf,

    #[arg(
        long,
        value_name = "PATH",
        help = "Chrome/Chromium executable (auto-detected if omitted)"
    )]
    pub browser_path: Option<PathBuf>,

    #[arg(
        long,
        default_value = "1280x1024",
        help = "Viewport dimensions (WIDTHxHEIGHT)"
    )]
    pub viewport: Viewport,

    #[arg(long, default_value = "400", help = "Page-load timeout (seconds)")]
    pub nav_timeout: u64,

    #[arg(
        long,
        default_value = "1",
        help = "Seconds between poll probes while an external analysis runs"
    )]
    pub poll_interval: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        value_name = "PATH",
        help = "Optional config file (TOML) to set defaults for viewport/timeouts/endpoints; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
