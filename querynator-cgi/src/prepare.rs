//! Upload file preparation.
//!
//! CGI wants a minimal tab separated table: CHROM POS ID REF ALT plus a
//! `SAMPLE` column so the annotated output can be traced back to its sample.

use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use fxhash::FxHashSet;
use log::info;

use crate::consts::{CGI_INPUT_SUFFIX, SAMPLE_COLUMN, UPLOAD_COLUMNS};
use crate::errors::{CgiError, Result};
use crate::models::VariantRecord;
use crate::utils::{get_dynamic_reader, sample_path};

/// Write `<out_dir>/<sample>.cgi_input.tsv` from a variant table.
///
/// The first non-empty line is taken as the header. Only the first five
/// columns are kept, exact duplicate rows are dropped (first occurrence wins)
/// and every row gets the sample label appended.
///
/// # Arguments
/// - input: tab separated variant file, optionally gzipped
/// - sample: sample name, used as label and as file base name
/// - out_dir: directory to write the upload file into
///
/// # Returns
/// - path to the upload file
pub fn prepare_query_file(input: &Path, sample: &str, out_dir: &Path) -> Result<PathBuf> {
    let reader = get_dynamic_reader(input)?;

    let mut header: Option<Vec<String>> = None;
    let mut seen: FxHashSet<VariantRecord> = FxHashSet::default();
    let mut records: Vec<VariantRecord> = Vec::new();
    let mut duplicates = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if header.is_none() {
            header = Some(header_columns(line, idx + 1)?);
            continue;
        }

        let record = VariantRecord::from_line(line, idx + 1)?;
        if seen.insert(record.clone()) {
            records.push(record);
        } else {
            duplicates += 1;
        }
    }

    let header = header.ok_or_else(|| CgiError::EmptyInput(input.to_path_buf()))?;

    create_dir_all(out_dir)?;
    let upload = sample_path(out_dir, sample, CGI_INPUT_SUFFIX);
    let mut writer = BufWriter::new(File::create(&upload)?);

    writeln!(writer, "{}\t{}", header.join("\t"), SAMPLE_COLUMN)?;
    for record in &records {
        writeln!(writer, "{}", record.to_line(sample))?;
    }
    writer.flush()?;

    info!(
        "Prepared {} variants for upload ({} duplicates dropped): {}",
        records.len(),
        duplicates,
        upload.display()
    );

    Ok(upload)
}

fn header_columns(line: &str, line_number: usize) -> Result<Vec<String>> {
    let columns: Vec<String> = line
        .split('\t')
        .take(UPLOAD_COLUMNS)
        .map(String::from)
        .collect();

    if columns.len() < UPLOAD_COLUMNS {
        return Err(CgiError::MalformedRow {
            line: line_number,
            expected: UPLOAD_COLUMNS,
            found: columns.len(),
        });
    }
    Ok(columns)
}
