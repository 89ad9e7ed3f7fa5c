//! CGI REST client.
//!
//! This module provides the [`CgiClient`] type and its builder. The client
//! submits upload files, polls job logs and downloads result archives.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use log::{debug, info, warn};
use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, Response};

use super::consts::{
    ACTION_DOWNLOAD, ACTION_LOGS, ANALYSIS_DONE_MARKER, CGI_EMAIL_ENV, CGI_TOKEN_ENV,
    MUTATIONS_FIELD, QUERY_TITLE, RETRY_STATUS_CODES,
};
use super::errors::{CgiError, Result};
use super::models::{CancerType, Credentials, GenomeBuild, PollConfig, PollStatus, QueryJob};
use super::utils::{cgi_api_from_env, credentials_from_env, env_var};

/// Pause between two status polls.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Builder for constructing a [`CgiClient`] with custom configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use querynator_cgi::client::CgiClient;
/// use querynator_cgi::models::Credentials;
///
/// # fn main() -> querynator_cgi::errors::Result<()> {
/// let client = CgiClient::builder()
///     .with_api("https://www.cancergenomeinterpreter.org/api/v1".to_string())
///     .with_credentials(Credentials::new("me@example.com", "my-token"))
///     .finish()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct CgiClientBuilder {
    api: Option<String>,
    credentials: Option<Credentials>,
    poll_config: Option<PollConfig>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl CgiClientBuilder {
    /// Creates a new, empty CgiClientBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the CGI API url.
    pub fn with_api(mut self, api: String) -> Self {
        self.api = Some(api);
        self
    }

    /// Sets the account credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the poller timing.
    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = Some(poll_config);
        self
    }

    /// Replaces the sleep between polls.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Consumes the builder and creates a CgiClient.
    ///
    /// Unset values fall back to the environment (`CGI_API`, `CGI_EMAIL`,
    /// `CGI_TOKEN`) and the default poll timing.
    pub fn finish(self) -> Result<CgiClient> {
        self.finish_with_env(env_var)
    }

    fn finish_with_env(self, env: impl Fn(&str) -> Option<String>) -> Result<CgiClient> {
        let api = self
            .api
            .map(|a| a.trim_end_matches('/').to_string())
            .unwrap_or_else(|| cgi_api_from_env(&env));

        let credentials = match self.credentials {
            Some(c) => c,
            None => credentials_from_env(None, None, &env).ok_or_else(|| {
                CgiError::MissingCredentials(format!(
                    "pass an e-mail and token or set {} and {}",
                    CGI_EMAIL_ENV, CGI_TOKEN_ENV
                ))
            })?,
        };

        // uploads and downloads run unbounded, polls set their own timeout
        let http = Client::builder()
            .default_headers(credentials.headers()?)
            .timeout(None::<Duration>)
            .build()?;

        Ok(CgiClient {
            api,
            poll_config: self.poll_config.unwrap_or_default(),
            sleeper: self.sleeper.unwrap_or_else(|| Arc::new(ThreadSleeper)),
            http,
        })
    }
}

/// Client for a single CGI account.
///
/// Each query goes through three calls: [`CgiClient::submit`],
/// [`CgiClient::wait_for_completion`] and [`CgiClient::download_results`].
/// [`crate::pipeline::query_cgi`] chains them with input preparation and
/// result extraction.
pub struct CgiClient {
    /// CGI API endpoint URL, without trailing slash
    pub api: String,
    /// Timing of the status poller
    pub poll_config: PollConfig,
    sleeper: Arc<dyn Sleeper>,
    http: Client,
}

impl CgiClient {
    /// Creates a new builder for constructing a [`CgiClient`].
    pub fn builder() -> CgiClientBuilder {
        CgiClientBuilder::default()
    }

    /// Status/download URL of a job
    pub fn job_url(&self, job_id: &str) -> String {
        format!("{}/{}", self.api, job_id)
    }

    /// Submit a prepared upload file.
    /// # Arguments
    /// - upload: file written by [`crate::prepare::prepare_query_file`]
    /// - genome: genome build, GRC names are translated to hg19/hg38
    /// - cancer_type: CGI cancer type
    ///
    /// # Returns
    /// - the accepted job
    pub fn submit(&self, upload: &Path, genome: &str, cancer_type: &CancerType) -> Result<QueryJob> {
        info!("Querying REST API");

        let genome = GenomeBuild::from(genome);
        let form = Form::new()
            .text("cancer_type", cancer_type.name.clone())
            .text("title", QUERY_TITLE)
            .text("reference", genome.to_string())
            .file(MUTATIONS_FIELD, upload)?;

        let response = self.http.post(&self.api).multipart(form).send()?;
        let body = check_status(response)?.text()?;

        let id = parse_job_id(&body);
        let url = self.job_url(&id);
        info!("CGI job {} submitted: {}", id, url);

        Ok(QueryJob {
            id,
            url,
            genome,
            cancer_type: cancer_type.clone(),
            submitted_at: Local::now(),
        })
    }

    /// Poll the job log until the analysis is done or the attempt ceiling is hit.
    ///
    /// The first poll is sent once; every follow-up poll is retried on
    /// throttling and server errors. Reaching the ceiling is not an error.
    pub fn wait_for_completion(&self, job: &QueryJob) -> Result<PollStatus> {
        let config = &self.poll_config;

        let mut logs = self.fetch_logs(&job.url, 0)?;
        let mut attempts = 0;

        while !logs.contains(ANALYSIS_DONE_MARKER) {
            if attempts == config.max_attempts {
                warn!(
                    "CGI job {} still running after {} polls, giving up waiting",
                    job.id,
                    attempts + 1
                );
                return Ok(PollStatus::TimedOut { attempts });
            }
            self.sleeper.sleep(config.interval);

            logs = self.fetch_logs(&job.url, config.transport_retries)?;
            attempts += 1;
            debug!("CGI job {} poll {}/{}", job.id, attempts, config.max_attempts);
        }

        info!("CGI Query finished");
        Ok(PollStatus::Done { attempts })
    }

    /// Download the result archive of a job into `archive`.
    pub fn download_results(&self, job: &QueryJob, archive: &Path) -> Result<PathBuf> {
        info!("Downloading CGI results");

        let response = self.get_action(&job.url, ACTION_DOWNLOAD, None, 0)?;
        let bytes = response.bytes()?;

        let mut file = File::create(archive)?;
        file.write_all(&bytes)?;

        info!("CGI results saved to {}", archive.display());
        Ok(archive.to_path_buf())
    }

    /// Fetch the job log and join its lines into one string
    fn fetch_logs(&self, url: &str, retries: u32) -> Result<String> {
        let timeout = Some(self.poll_config.request_timeout);
        let body = self.get_action(url, ACTION_LOGS, timeout, retries)?.text()?;

        let json: serde_json::Value = serde_json::from_str(&body)?;
        let lines = json["logs"].as_array().ok_or(CgiError::MalformedLogs)?;

        Ok(lines.iter().filter_map(|l| l.as_str()).collect())
    }

    /// GET `<url>?action=<action>`, retrying up to `retries` times on
    /// connection errors and retryable statuses
    fn get_action(
        &self,
        url: &str,
        action: &str,
        timeout: Option<Duration>,
        retries: u32,
    ) -> Result<Response> {
        let mut remaining = retries;
        loop {
            let mut request = self.http.get(url).query(&[("action", action)]);
            if let Some(timeout) = timeout {
                request = request.timeout(timeout);
            }

            match request.send() {
                Ok(response)
                    if remaining > 0
                        && RETRY_STATUS_CODES.contains(&response.status().as_u16()) =>
                {
                    remaining -= 1;
                    debug!(
                        "Retrying {} after HTTP {} ({} retries left)",
                        url,
                        response.status(),
                        remaining
                    );
                }
                Ok(response) => return check_status(response),
                Err(e) if remaining > 0 && (e.is_connect() || e.is_timeout()) => {
                    remaining -= 1;
                    debug!("Retrying {} after {} ({} retries left)", url, e, remaining);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(CgiError::Status {
            status,
            url: response.url().to_string(),
        })
    }
}

/// CGI answers a submission with the job id as a JSON string.
fn parse_job_id(body: &str) -> String {
    let body = body.trim();
    serde_json::from_str::<String>(body).unwrap_or_else(|_| body.trim_matches('"').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CGI_API_ENV, DEFAULT_CGI_API};
    use rstest::rstest;

    #[rstest]
    #[case("\"a1b2c3d4e5f6a7b8c9d0\"", "a1b2c3d4e5f6a7b8c9d0")]
    #[case("\"a1b2c3d4e5f6a7b8c9d0\"\n", "a1b2c3d4e5f6a7b8c9d0")]
    #[case("a1b2c3d4e5f6a7b8c9d0", "a1b2c3d4e5f6a7b8c9d0")]
    #[case("\"short\"", "short")]
    fn test_parse_job_id(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(parse_job_id(body), expected);
    }

    #[test]
    fn test_builder_trims_api() {
        let client = CgiClient::builder()
            .with_api("http://localhost:1234/api/v1/".to_string())
            .with_credentials(Credentials::new("me@example.com", "token"))
            .finish()
            .unwrap();

        assert_eq!(client.api, "http://localhost:1234/api/v1");
        assert_eq!(
            client.job_url("0123456789abcdef0123"),
            "http://localhost:1234/api/v1/0123456789abcdef0123"
        );
        assert_eq!(client.poll_config, PollConfig::default());
    }

    fn env_of(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars.to_vec();
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_builder_without_credentials() {
        let result = CgiClient::builder()
            .with_api("http://localhost:1234/api/v1".to_string())
            .finish_with_env(env_of(&[(CGI_EMAIL_ENV, "me@example.com")]));

        assert!(matches!(result, Err(CgiError::MissingCredentials(_))));
    }

    #[test]
    fn test_builder_falls_back_to_env() {
        let client = CgiClient::builder()
            .finish_with_env(env_of(&[
                (CGI_API_ENV, "http://localhost:4321/api/v1/"),
                (CGI_EMAIL_ENV, "me@example.com"),
                (CGI_TOKEN_ENV, "token"),
            ]))
            .unwrap();

        assert_eq!(client.api, "http://localhost:4321/api/v1");
    }

    #[test]
    fn test_builder_defaults_to_public_api() {
        let client = CgiClient::builder()
            .with_credentials(Credentials::new("me@example.com", "token"))
            .finish_with_env(env_of(&[]))
            .unwrap();

        assert_eq!(client.api, DEFAULT_CGI_API);
    }

    #[test]
    fn test_builder_rejects_bad_header() {
        let result = CgiClient::builder()
            .with_api("http://localhost:1234/api/v1".to_string())
            .with_credentials(Credentials::new("me@example.com", "tok\nen"))
            .finish();

        assert!(matches!(result, Err(CgiError::InvalidHeader(_))));
    }
}
