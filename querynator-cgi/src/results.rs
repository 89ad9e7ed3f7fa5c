//! Extraction of the CGI result archive and the metadata sidecar.

use std::fs::{File, create_dir_all};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use zip::ZipArchive;

use crate::consts::CGI_METADATA_FILE;
use crate::errors::{CgiError, Result};

/// A file shipped in the result archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    /// Name inside the archive
    pub name: String,
    /// Uncompressed size in bytes
    pub size: u64,
}

/// Unpacked results of one query.
#[derive(Debug, Clone)]
pub struct ResultSet {
    /// Directory the archive was extracted into
    pub directory: PathBuf,
    /// Path of the metadata file inside `directory`
    pub metadata: PathBuf,
    /// Files extracted from the archive
    pub files: Vec<ResultFile>,
}

/// Extract a result archive into `destination`.
///
/// # Arguments
/// - archive: the downloaded zip file
/// - destination: directory to extract into, created if needed
///
/// # Returns
/// - the files found in the archive (directories excluded)
pub fn extract_results(archive: &Path, destination: &Path) -> Result<Vec<ResultFile>> {
    if !archive.exists() {
        return Err(CgiError::MissingArchive(archive.to_path_buf()));
    }

    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;

    create_dir_all(destination)?;
    zip.extract(destination)?;

    let mut files = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        files.push(ResultFile {
            name: entry.name().to_string(),
            size: entry.size(),
        });
    }

    info!(
        "Extracted {} files from {} into {}",
        files.len(),
        archive.display(),
        destination.display()
    );

    Ok(files)
}

/// Write `metadata.txt` into a result directory.
///
/// # Arguments
/// - directory: the extracted result directory
/// - query_date: date the query was run
/// - api_version: API the results came from, left out when unknown
///
/// # Returns
/// - path to the metadata file
pub fn write_metadata(
    directory: &Path,
    query_date: NaiveDate,
    api_version: Option<&str>,
) -> Result<PathBuf> {
    let path = directory.join(CGI_METADATA_FILE);
    let mut file = File::create(&path)?;

    writeln!(file, "CGI query date: {}", query_date.format("%Y-%m-%d"))?;
    if let Some(version) = api_version {
        writeln!(file, "API version: {}", version)?;
    }

    Ok(path)
}

/// Extract the archive and add the metadata file next to the results.
pub fn unpack_results(
    archive: &Path,
    destination: &Path,
    query_date: NaiveDate,
    api_version: Option<&str>,
) -> Result<ResultSet> {
    let files = extract_results(archive, destination)?;
    let metadata = write_metadata(destination, query_date, api_version)?;

    Ok(ResultSet {
        directory: destination.to_path_buf(),
        metadata,
        files,
    })
}
