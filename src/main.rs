#![allow(non_snake_case)]

use anyhow::{Context, Result};
use log::debug;

use RustColor::config::RunConfig;
use RustColor::driver;
use RustColor::options::Options;

fn main() {
    if std::env::var("GCV_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("GCV_LOG")
            .write_style("GCV_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // flags from the environment come first so the command line overrides them
    let mut flags = shellwords::split(&std::env::var("GCV_FLAGS").unwrap_or_default())
        .context("Failed to split GCV_FLAGS")?;
    flags.extend(std::env::args().skip(1));

    let options = match Options::parse_from_args(&flags) {
        Ok(options) => options,
        // help, version and usage errors use clap's own output and exit codes
        Err(e) => match e.downcast::<clap::Error>() {
            Ok(clap_err) => clap_err.exit(),
            Err(e) => return Err(anyhow::anyhow!("{e}")),
        },
    };
    debug!("gcv options: {:?}", options);

    let mut config = match &options.config {
        Some(path) => RunConfig::load_from_file(path)?,
        None => RunConfig::default(),
    };
    options.apply(&mut config);
    debug!("gcv config: {:?}", config);

    let report = driver::run(&config)?;
    println!("{report}");

    if let Some(path) = &config.output {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report: {:?}", path))?;
    }
    Ok(())
}
