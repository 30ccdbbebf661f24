use clap::Parser;
use std::process::ExitCode;

mod args;
use args::{Args, build_collector};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let collector = match build_collector(&args) {
        Ok(collector) => collector,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    ::log::info!(
        "Starting collection for {} (WebDriver at {})",
        args.url,
        collector.config().browser.webdriver_url
    );
    let start_time = std::time::Instant::now();

    let result = match collector.collect(&args.url).await {
        Ok(result) => result,
        Err(e) => {
            ::log::error!("Collection failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    ::log::info!(
        "Collected {} pages in {:.2} seconds (overall score {})",
        result.summary.total_pages,
        start_time.elapsed().as_secs_f64(),
        result.summary.overall_score
    );

    let json = match serde_json::to_string_pretty(&result) {
        Ok(json) => json,
        Err(e) => {
            ::log::error!("Failed to serialize result: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, json) {
                ::log::error!("Failed to write {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
            ::log::info!("Wrote result to {}", path.display());
        }
        None => println!("{}", json),
    }

    ExitCode::SUCCESS
}
