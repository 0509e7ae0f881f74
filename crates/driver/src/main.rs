//! webtest - run test paths against the bundled demo page

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use webtest_driver::demo::{demo_catalog, demo_page};
use webtest_driver::{Driver, DriverConfig, DriverResult};
use webtest_harness::Harness;

#[derive(Parser, Debug)]
#[command(name = "webtest")]
#[command(author, version, about = "Load webtest scripts and report their results", long_about = None)]
struct Args {
    /// Test paths to load, in order
    paths: Vec<String>,

    /// TOML config file
    #[arg(short, long, env = "WEBTEST_CONFIG")]
    config: Option<PathBuf>,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Per-path timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the suite report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// List the scripts the demo catalog serves and exit
    #[arg(long)]
    list: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> DriverResult<bool> {
    let catalog = demo_catalog();
    if args.list {
        for path in catalog.paths() {
            println!("{}", path);
        }
        return Ok(true);
    }

    let mut config = match &args.config {
        Some(path) => DriverConfig::from_file(path)?,
        None => DriverConfig::default(),
    };
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(timeout) = args.timeout_secs {
        config.timeout_secs = timeout;
    }

    let paths = if args.paths.is_empty() {
        catalog.paths().map(str::to_string).collect()
    } else {
        args.paths
    };

    let harness = Harness::with_config(config.harness.clone(), demo_page()?, Arc::new(catalog));
    let driver = Driver::new(harness, config);

    let suite = driver.run_paths(&paths).await?;
    driver.write_results(&suite)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suite)?);
    }

    Ok(suite.success())
}
