mod cgi;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "querynator";
    pub const DEFAULT_LOG_FILTER: &str = "info";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Query variant interpretation services with your variant files and collect the annotated results.")
        .subcommand_required(true)
        .subcommand(cgi::cli::create_cgi_cli())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(consts::DEFAULT_LOG_FILTER),
    )
    .init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // CGI
        //
        Some((cgi::cli::CGI_CMD, matches)) => {
            cgi::handlers::run_cgi(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_is_valid() {
        build_parser().debug_assert();
    }

    #[test]
    fn test_parse_query() {
        let matches = build_parser()
            .try_get_matches_from([
                "querynator", "cgi", "query", "-i", "variants.tsv", "-o", "sample1", "-c", "LUAD",
                "-g", "GRCh37", "--max-attempts", "2",
            ])
            .unwrap();

        let (_, cgi) = matches.subcommand().unwrap();
        let (name, query) = cgi.subcommand().unwrap();
        assert_eq!(name, cgi::cli::CGI_QUERY);
        assert_eq!(query.get_one::<String>("genome").unwrap(), "GRCh37");
        assert_eq!(query.get_one::<u32>("max-attempts"), Some(&2));
        assert_eq!(query.get_one::<String>("outdir").unwrap(), ".");
    }

    #[test]
    fn test_query_requires_cancer_type() {
        let result = build_parser().try_get_matches_from([
            "querynator", "cgi", "query", "-i", "variants.tsv", "-o", "sample1",
        ]);
        assert!(result.is_err());
    }
}
