use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use log::info;

use querynator_cgi::client::CgiClient;
use querynator_cgi::consts::{CGI_PREPARE, CGI_QUERY};
use querynator_cgi::models::{CancerType, PollConfig};
use querynator_cgi::prepare::prepare_query_file;
use querynator_cgi::utils::{expand_path, print_result_files, resolve_credentials};
use querynator_cgi::{QueryOutcome, query_cgi};

/// Excute the input commands from CLI
/// # Arguments
/// - matches: matched items from CLAP args
pub fn run_cgi(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some((CGI_QUERY, matches)) => run_query(matches),
        Some((CGI_PREPARE, matches)) => run_prepare(matches),
        _ => unreachable!("Unknown CGI subcommand"),
    }
}

fn run_prepare(matches: &ArgMatches) -> Result<()> {
    let (input, sample, outdir) = io_args(matches);

    let upload = prepare_query_file(&input, sample, &outdir)
        .with_context(|| format!("Failed to prepare {}", input.display()))?;
    println!("{}", upload.display());

    Ok(())
}

fn run_query(matches: &ArgMatches) -> Result<()> {
    let (input, sample, outdir) = io_args(matches);

    let genome = matches
        .get_one::<String>("genome")
        .expect("A genome build is required");
    let cancer: CancerType = matches
        .get_one::<String>("cancer")
        .expect("A cancer type is required")
        .parse()
        .map_err(|e| anyhow!("Invalid cancer type: {}", e))?;

    let mut builder = CgiClient::builder().with_poll_config(poll_config(matches));
    if let Some(api) = matches.get_one::<String>("api") {
        builder = builder.with_api(api.to_string());
    }
    if let Some(credentials) = resolve_credentials(
        matches.get_one::<String>("email").map(String::as_str),
        matches.get_one::<String>("token").map(String::as_str),
    ) {
        builder = builder.with_credentials(credentials);
    }
    let client = builder.finish().context("Failed to create the CGI client")?;

    let outcome = query_cgi(&client, &input, genome, &cancer, sample, &outdir)
        .with_context(|| format!("CGI query for {} failed", sample))?;

    match outcome {
        QueryOutcome::Completed { results, .. } => {
            print_result_files(&results.files);
            info!("Results written to {}", results.directory.display());
            Ok(())
        }
        QueryOutcome::DownloadFailed { job, reason, .. } => Err(anyhow!(
            "Could not download the results of CGI job {}: {}",
            job.id,
            reason
        )),
    }
}

fn io_args(matches: &ArgMatches) -> (PathBuf, &str, PathBuf) {
    let input = matches
        .get_one::<String>("input")
        .expect("A path to a variant file is required");
    let sample = matches
        .get_one::<String>("output")
        .expect("A sample name is required");
    let outdir = matches
        .get_one::<String>("outdir")
        .map(|d| expand_path(d))
        .unwrap_or_else(|| PathBuf::from("."));

    (expand_path(input), sample.as_str(), outdir)
}

fn poll_config(matches: &ArgMatches) -> PollConfig {
    let mut config = PollConfig::default();
    if let Some(max_attempts) = matches.get_one::<u32>("max-attempts") {
        config.max_attempts = *max_attempts;
    }
    if let Some(interval) = matches.get_one::<u64>("interval") {
        config.interval = Duration::from_secs(*interval);
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.request_timeout = Duration::from_secs(*timeout);
    }
    config
}
