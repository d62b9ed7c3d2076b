mod cli;
mod settings;

use std::process::ExitCode;
use std::sync::Arc;

use sitereport_lib::{
    allocate_output_dir, build_stages, BrowserHandle, Config, Credentials, ProgressCallback,
    ReportError, RunContext, StagePipeline, Target,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let args = cli::parse();

    let config = match settings::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return fatal(&err),
    };
    let flags = settings::FlagSources::from_args(&raw_args);
    let mut config = settings::resolve_settings(
        args.viewport,
        args.nav_timeout,
        args.poll_interval,
        &args.assets_dir,
        config,
        &flags,
    );
    // Pin the download directory now so the browser session and the
    // optimize stage see the same path.
    match config.resolved_download_dir() {
        Ok(dir) => config.download_dir = Some(dir),
        Err(err) => return fatal(&err),
    }
    if args.verbose {
        settings::log_effective_config(args.config.as_deref(), &config);
    }

    let target = match Target::parse(&args.url) {
        Ok(target) => target,
        Err(err) => return fatal(&err),
    };

    let output_dir = match allocate_output_dir(&args.output_dir, &args.name) {
        Ok(dir) => dir,
        Err(err) => return fatal(&err),
    };

    let browser = match launch_browser(&args, &config).await {
        Ok(browser) => browser,
        Err(err) => return fatal(&err),
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("interrupt received; finishing the current stage");
                cancel.cancel();
            }
        });
    }

    let credentials = Credentials::from_env();
    if credentials.is_none() && args.verbose {
        eprintln!("SITEREPORT_EMAIL/SITEREPORT_PASSWORD not set; the performance stage will fail");
    }
    let progress: ProgressCallback = Arc::new(|message: &str| eprintln!("{message}"));

    let ctx = RunContext::new(args.name.clone(), output_dir.clone(), target, browser);
    let pipeline = StagePipeline::new(build_stages(&config, credentials, args.optimize))
        .with_cancellation(cancel)
        .with_progress(progress);

    let report = pipeline.run(ctx).await;

    let succeeded = report.results.len() - report.failed_stages();
    eprintln!(
        "Done in {:.1}s: {}/{} stages succeeded, {} artifact(s) in {}",
        report.total_duration.as_secs_f32(),
        succeeded,
        report.results.len(),
        report.artifacts_produced,
        output_dir.display(),
    );

    // Individual stage failures are part of a normal run; only setup
    // failures produce a non-zero exit.
    ExitCode::SUCCESS
}

#[cfg(feature = "headless-chrome")]
async fn launch_browser(
    args: &cli::Cli,
    config: &Config,
) -> sitereport_lib::Result<BrowserHandle> {
    use sitereport_lib::{CdpBrowser, CdpBrowserOptions};

    let options = CdpBrowserOptions {
        browser_path: args.browser_path.clone(),
        window_width: config.viewport.width,
        window_height: config.viewport.height,
        download_dir: config.download_dir.clone(),
    };
    Ok(Box::new(CdpBrowser::launch(options).await?))
}

#[cfg(not(feature = "headless-chrome"))]
async fn launch_browser(
    _args: &cli::Cli,
    _config: &Config,
) -> sitereport_lib::Result<BrowserHandle> {
    Err(ReportError::browser(
        "failed to launch: this build has no browser backend; rebuild with --features headless-chrome",
    ))
}

fn fatal(err: &ReportError) -> ExitCode {
    let payload = err.to_payload();
    eprintln!("error[{}]: {}", payload.category, payload.message);
    if let Some(remediation) = payload.remediation {
        eprintln!("hint: {remediation}");
    }
    ExitCode::from(2)
}
