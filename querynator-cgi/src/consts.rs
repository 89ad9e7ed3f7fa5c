//! Constants for the CGI client: environment variables, endpoints, file naming
//! and polling defaults.

// Environment variable names

/// Environment variable name for overriding the CGI API endpoint.
///
/// When set, this overrides the default endpoint (`https://www.cancergenomeinterpreter.org/api/v1`).
///
/// # Example
///
/// ```bash
/// export CGI_API=https://www.cancergenomeinterpreter.org/api/v1
/// ```
pub const CGI_API_ENV: &str = "CGI_API";

/// Environment variable holding the e-mail address of the CGI account.
pub const CGI_EMAIL_ENV: &str = "CGI_EMAIL";

/// Environment variable holding the CGI API token.
pub const CGI_TOKEN_ENV: &str = "CGI_TOKEN";

/// Default CGI REST endpoint. Jobs live directly below it at `<api>/<job_id>`.
pub const DEFAULT_CGI_API: &str = "https://www.cancergenomeinterpreter.org/api/v1";

// Command-line interface command names

/// Main CGI command name.
pub const CGI_CMD: &str = "cgi";

/// Subcommand running the whole prepare/submit/poll/download pipeline.
pub const CGI_QUERY: &str = "query";

/// Subcommand that only writes the upload file.
pub const CGI_PREPARE: &str = "prepare";

// File naming

/// Suffix of the prepared upload file, `<sample>.cgi_input.tsv`.
pub const CGI_INPUT_SUFFIX: &str = ".cgi_input.tsv";

/// Suffix of the downloaded result archive, `<sample>.cgi_results.zip`.
pub const CGI_RESULTS_ZIP_SUFFIX: &str = ".cgi_results.zip";

/// Suffix of the directory the archive is extracted into, `<sample>.cgi_results/`.
pub const CGI_RESULTS_DIR_SUFFIX: &str = ".cgi_results";

/// Name of the metadata file written into the results directory.
pub const CGI_METADATA_FILE: &str = "metadata.txt";

// Upload format

/// Number of leading variant columns kept in the upload file (CHROM POS ID REF ALT).
pub const UPLOAD_COLUMNS: usize = 5;

/// Header of the column carrying the sample label.
pub const SAMPLE_COLUMN: &str = "SAMPLE";

/// Multipart field the variant file is uploaded under.
pub const MUTATIONS_FIELD: &str = "mutations";

/// Title given to every submitted job.
pub const QUERY_TITLE: &str = "CGI_query";

// Job status

/// Substring of the job log that signals a finished analysis.
pub const ANALYSIS_DONE_MARKER: &str = "Analysis done";

/// `action` query parameter for fetching the job log.
pub const ACTION_LOGS: &str = "logs";

/// `action` query parameter for downloading the result archive.
pub const ACTION_DOWNLOAD: &str = "download";

// Polling defaults

/// Follow-up polls made after the first one before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Seconds to wait between two polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Per-request timeout for status polls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Transport level retries of a follow-up poll.
pub const DEFAULT_TRANSPORT_RETRIES: u32 = 3;

/// Statuses a follow-up poll is retried on.
pub const RETRY_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Default genome build when none is given.
pub const DEFAULT_GENOME: &str = "hg38";
