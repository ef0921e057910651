use anyhow::Result;
use clap::Parser;
use ksl_notify::cli::{Cli, Command};
use ksl_notify::commands::{build_transport, load_seen, print_reports, run_notify, run_search};
use ksl_notify::config::{LoggingConfig, NotifyConfig, SearchConfig};
use ksl_notify::logging::init_logging;
use ksl_notify::scraper::HttpFetcher;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LoggingConfig {
        level: cli.loglevel.clone(),
        logfile: cli.logfile.clone(),
    })?;

    match cli.command {
        Command::Search(args) => {
            let config = SearchConfig::try_from(&args)?;
            let reports = run_search(&config, HttpFetcher::new()?)?;
            print_reports(&reports, config.terms.len() > 1);
        }
        Command::Notify(args) => {
            // Configuration and credential problems end the process here.
            let (config, mail) = NotifyConfig::from_args(&args)?;
            let seen = load_seen(args.load.as_deref())?;
            let transport = build_transport(&mail, &config.sender)?;

            if let Err(e) = run_notify(config, transport.as_ref(), HttpFetcher::new()?, seen, args.once) {
                tracing::error!("{e}");
                return Err(e.into());
            }
        }
    }

    Ok(())
}
