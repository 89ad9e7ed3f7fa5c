//! Domain types shared by the pipeline steps.

use std::fmt::{self, Display};
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Local};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::consts::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_TRANSPORT_RETRIES, UPLOAD_COLUMNS,
};
use crate::errors::{CgiError, Result};

/// Reference genome accepted by CGI.
///
/// CGI only knows `hg19` and `hg38`; the GRC names are translated, anything else
/// is sent as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenomeBuild {
    Hg19,
    Hg38,
    Other(String),
}

impl GenomeBuild {
    pub fn as_str(&self) -> &str {
        match self {
            GenomeBuild::Hg19 => "hg19",
            GenomeBuild::Hg38 => "hg38",
            GenomeBuild::Other(s) => s,
        }
    }
}

impl From<&str> for GenomeBuild {
    fn from(genome: &str) -> Self {
        match genome {
            "GRCh37" | "hg19" => GenomeBuild::Hg19,
            "GRCh38" | "hg38" => GenomeBuild::Hg38,
            other => GenomeBuild::Other(other.to_string()),
        }
    }
}

impl Display for GenomeBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a genome build name onto the token CGI expects.
pub fn normalize_genome(genome: &str) -> String {
    GenomeBuild::from(genome).to_string()
}

/// CGI cancer type, identified by its short name (e.g. `CANCER`, `LUAD`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancerType {
    pub name: String,
}

impl CancerType {
    pub fn new(name: &str) -> Self {
        CancerType {
            name: name.to_string(),
        }
    }
}

impl FromStr for CancerType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err("cancer type can't be empty".to_string());
        }
        Ok(CancerType::new(name))
    }
}

/// CGI account credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub token: String,
}

impl Credentials {
    pub fn new(email: &str, token: &str) -> Self {
        Credentials {
            email: email.to_string(),
            token: token.to_string(),
        }
    }

    /// Value of the `Authorization` header: `<email> <token>`.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.email, self.token)
    }

    /// Headers attached to every request made with these credentials.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut value = HeaderValue::from_str(&self.authorization())?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

// keep the token out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("token", &"***")
            .finish()
    }
}

/// Timing of the status poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Follow-up polls made after the first one before giving up.
    pub max_attempts: u32,
    /// Pause before every follow-up poll.
    pub interval: Duration,
    /// Timeout of a single status request.
    pub request_timeout: Duration,
    /// Retries of a follow-up poll on throttling or server errors.
    pub transport_retries: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            transport_retries: DEFAULT_TRANSPORT_RETRIES,
        }
    }
}

/// Final state of the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// The completion marker showed up after `attempts` follow-up polls.
    Done { attempts: u32 },
    /// The attempt ceiling was reached without seeing the marker.
    TimedOut { attempts: u32 },
}

impl PollStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, PollStatus::Done { .. })
    }
}

/// A job accepted by CGI.
#[derive(Debug, Clone)]
pub struct QueryJob {
    /// Opaque identifier assigned by CGI.
    pub id: String,
    /// Status/download URL, `<api>/<id>`.
    pub url: String,
    pub genome: GenomeBuild,
    pub cancer_type: CancerType,
    pub submitted_at: DateTime<Local>,
}

/// The five leading columns of a variant row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantRecord {
    pub chrom: String,
    pub pos: String,
    pub id: String,
    pub reference: String,
    pub alternate: String,
}

impl VariantRecord {
    /// Build a record from a tab separated line, ignoring columns past the fifth.
    ///
    /// # Arguments
    /// - line: the raw line
    /// - line_number: 1-based line number, used in the error
    pub fn from_line(line: &str, line_number: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').take(UPLOAD_COLUMNS).collect();
        if fields.len() < UPLOAD_COLUMNS {
            return Err(CgiError::MalformedRow {
                line: line_number,
                expected: UPLOAD_COLUMNS,
                found: line.split('\t').count(),
            });
        }

        Ok(VariantRecord {
            chrom: fields[0].to_string(),
            pos: fields[1].to_string(),
            id: fields[2].to_string(),
            reference: fields[3].to_string(),
            alternate: fields[4].to_string(),
        })
    }

    /// Render the record followed by the sample label.
    pub fn to_line(&self, sample: &str) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom, self.pos, self.id, self.reference, self.alternate, sample
        )
    }
}
