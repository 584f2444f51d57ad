use std::io::{self, Write};

use clap::Parser;
use cnctools::cli::Cli;
use cnctools::commands::execute;
use cnctools::settings::Config;
use cnctools::{init_logging, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;
    tracing::debug!("cnctools {} built {}", VERSION, BUILD_DATE);

    let config = Config::load_or_default(cli.config.as_deref())?;

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut report = stderr.lock();

    execute(&cli.command, &config, &mut out, &mut report)?;
    out.flush()?;

    Ok(())
}
