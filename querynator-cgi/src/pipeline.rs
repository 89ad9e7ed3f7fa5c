//! The full CGI query: prepare, submit, poll, download, unpack.

use std::path::Path;

use chrono::Local;
use log::{info, warn};

use crate::client::CgiClient;
use crate::consts::{CGI_RESULTS_DIR_SUFFIX, CGI_RESULTS_ZIP_SUFFIX};
use crate::errors::{CgiError, Result};
use crate::models::{CancerType, PollStatus, QueryJob};
use crate::prepare::prepare_query_file;
use crate::results::{ResultSet, unpack_results};
use crate::utils::sample_path;

/// How a query ended once the job was accepted.
#[derive(Debug)]
pub enum QueryOutcome {
    /// Results were downloaded and unpacked.
    Completed {
        job: QueryJob,
        status: PollStatus,
        results: ResultSet,
    },
    /// The archive could not be downloaded, nothing was unpacked.
    DownloadFailed {
        job: QueryJob,
        status: PollStatus,
        reason: CgiError,
    },
}

impl QueryOutcome {
    pub fn job(&self) -> &QueryJob {
        match self {
            QueryOutcome::Completed { job, .. } | QueryOutcome::DownloadFailed { job, .. } => job,
        }
    }
}

/// Run a complete CGI query for one sample.
///
/// Errors while preparing the input, submitting or polling abort the query.
/// A poller that runs out of attempts only logs a warning and the download is
/// tried anyway. A failed download is reported as
/// [`QueryOutcome::DownloadFailed`] and extraction is skipped.
///
/// # Arguments
/// - client: configured CGI client
/// - input: tab separated variant file
/// - genome: genome build of the variants
/// - cancer_type: CGI cancer type
/// - sample: sample name, base name of every output
/// - out_dir: directory receiving all outputs
pub fn query_cgi(
    client: &CgiClient,
    input: &Path,
    genome: &str,
    cancer_type: &CancerType,
    sample: &str,
    out_dir: &Path,
) -> Result<QueryOutcome> {
    let upload = prepare_query_file(input, sample, out_dir)?;
    let job = client.submit(&upload, genome, cancer_type)?;
    let status = client.wait_for_completion(&job)?;

    let archive = sample_path(out_dir, sample, CGI_RESULTS_ZIP_SUFFIX);
    let archive = match client.download_results(&job, &archive) {
        Ok(archive) => archive,
        Err(reason) => {
            warn!("Ooops, the CGI download failed: {}", reason);
            return Ok(QueryOutcome::DownloadFailed {
                job,
                status,
                reason,
            });
        }
    };

    let destination = sample_path(out_dir, sample, CGI_RESULTS_DIR_SUFFIX);
    let results = unpack_results(
        &archive,
        &destination,
        Local::now().date_naive(),
        Some(client.api.as_str()),
    )?;
    info!("CGI results for {} in {}", sample, results.directory.display());

    Ok(QueryOutcome::Completed {
        job,
        status,
        results,
    })
}
