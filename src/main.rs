use clap::Parser;
use doxy_search::cli::{Cli, Commands};
use doxy_search::config::Config;
use doxy_search::tools::{
    CheckRequest, DumpRequest, GetRequest, SectionsRequest, handle_check, handle_dump,
    handle_get, handle_sections,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    doxy_search::tracing::init(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.no_cache {
        config.cache_enabled = false;
    }

    let (output, success) = match cli.command {
        Commands::Check {
            path,
            require_anchor,
            json,
        } => {
            let request = CheckRequest {
                path,
                // Only an explicit flag overrides the config file
                require_anchor: require_anchor.then_some(true),
                json,
            };
            let outcome = handle_check(&config, request).await?;
            (outcome.output, outcome.ok)
        }
        Commands::Get {
            path,
            symbol,
            section,
            raw_key,
        } => {
            let request = GetRequest {
                path,
                symbol,
                section,
                raw_key,
            };
            handle_get(&config, request).await?
        }
        Commands::Dump { path, json } => (handle_dump(&config, DumpRequest { path, json }).await?, true),
        Commands::Sections { path } => (handle_sections(SectionsRequest { path }).await?, true),
    };

    print!("{}", output);
    Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
