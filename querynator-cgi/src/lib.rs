//! Client for the Cancer Genome Interpreter (CGI) REST API.
//!
//! A query runs in four steps: [`prepare::prepare_query_file`] writes the
//! upload table, [`client::CgiClient::submit`] starts the job,
//! [`client::CgiClient::wait_for_completion`] polls the job log and
//! [`client::CgiClient::download_results`] fetches the archive, which
//! [`results::unpack_results`] extracts next to a metadata file.
//! [`pipeline::query_cgi`] runs all of them.

pub mod client;
pub mod consts;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod prepare;
pub mod results;
pub mod utils;

pub use client::CgiClient;
pub use errors::{CgiError, Result};
pub use pipeline::{QueryOutcome, query_cgi};
