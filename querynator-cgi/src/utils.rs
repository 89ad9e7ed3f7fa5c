use std::env;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tabled::{Table, Tabled};

use super::consts::{CGI_API_ENV, CGI_EMAIL_ENV, CGI_TOKEN_ENV, DEFAULT_CGI_API};
use super::errors::Result;
use super::models::Credentials;
use super::results::ResultFile;

/// Read an environment variable, treating unset and non-unicode values alike
pub fn env_var(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Get default CGI api from environment variable
///
/// # Returns
/// - CGI api url without trailing slash
pub fn get_default_cgi_api() -> String {
    cgi_api_from_env(env_var)
}

/// CGI api from the given variable lookup, the default endpoint if unset
pub fn cgi_api_from_env(env: impl Fn(&str) -> Option<String>) -> String {
    env(CGI_API_ENV)
        .unwrap_or_else(|| DEFAULT_CGI_API.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Combine command line values with the environment.
///
/// Each of e-mail and token is taken from its argument when given, otherwise
/// from `CGI_EMAIL`/`CGI_TOKEN`.
pub fn resolve_credentials(email: Option<&str>, token: Option<&str>) -> Option<Credentials> {
    credentials_from_env(email, token, env_var)
}

/// Same as [`resolve_credentials`] with a custom variable lookup
pub fn credentials_from_env(
    email: Option<&str>,
    token: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Option<Credentials> {
    let email = email.map(String::from).or_else(|| env(CGI_EMAIL_ENV))?;
    let token = token.map(String::from).or_else(|| env(CGI_TOKEN_ENV))?;
    Some(Credentials::new(&email, &token))
}

/// Expand `~` and environment variables in a user supplied path
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path)
        .unwrap_or_else(|_| path.into())
        .into_owned();
    PathBuf::from(expanded)
}

/// Path of a per-sample output: `<out_dir>/<sample><suffix>`
pub fn sample_path(out_dir: &Path, sample: &str, suffix: &str) -> PathBuf {
    out_dir.join(format!("{}{}", sample, suffix))
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path)?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

#[derive(Tabled)]
struct ResultFilePrint {
    file: String,
    bytes: u64,
}

pub fn print_result_files(files: &[ResultFile]) {
    let rows: Vec<ResultFilePrint> = files
        .iter()
        .map(|f| ResultFilePrint {
            file: f.name.clone(),
            bytes: f.size,
        })
        .collect();

    let table = Table::new(rows);

    println!("{}", table);
}
