use clap::{Arg, Command, value_parser};

pub use querynator_cgi::consts::{CGI_CMD, CGI_PREPARE, CGI_QUERY, DEFAULT_GENOME};

fn input_arg() -> Arg {
    Arg::new("input")
        .long("input")
        .short('i')
        .required(true)
        .help("Tab separated variant file (CHROM POS ID REF ALT ...), optionally gzipped")
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .required(true)
        .help("Sample name, used as label and as base name of all outputs")
}

fn outdir_arg() -> Arg {
    Arg::new("outdir")
        .long("outdir")
        .default_value(".")
        .help("Directory to write the outputs to")
}

pub fn create_cgi_cli() -> Command {
    Command::new(CGI_CMD)
        .about("Query the Cancer Genome Interpreter (CGI) REST API")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CGI_QUERY)
                .about("Submit a variant file to CGI, wait for the analysis and download the results")
                .arg(input_arg())
                .arg(output_arg())
                .arg(outdir_arg())
                .arg(
                    Arg::new("genome")
                        .long("genome")
                        .short('g')
                        .default_value(DEFAULT_GENOME)
                        .help("Genome build: GRCh37/hg19 or GRCh38/hg38"),
                )
                .arg(
                    Arg::new("cancer")
                        .long("cancer")
                        .short('c')
                        .required(true)
                        .help("CGI cancer type, e.g. CANCER, LUAD, BRCA"),
                )
                .arg(
                    Arg::new("email")
                        .long("email")
                        .short('e')
                        .help("E-mail of the CGI account [env: CGI_EMAIL]"),
                )
                .arg(
                    Arg::new("token")
                        .long("token")
                        .short('t')
                        .help("CGI API token [env: CGI_TOKEN]"),
                )
                .arg(
                    Arg::new("api")
                        .long("api")
                        .help("CGI API url [env: CGI_API]"),
                )
                .arg(
                    Arg::new("max-attempts")
                        .long("max-attempts")
                        .value_parser(value_parser!(u32))
                        .help("Status polls after the first one before giving up [default: 5]"),
                )
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .value_parser(value_parser!(u64))
                        .help("Seconds between status polls [default: 60]"),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_parser(value_parser!(u64))
                        .help("Timeout of a status request in seconds [default: 5]"),
                ),
        )
        .subcommand(
            Command::new(CGI_PREPARE)
                .about("Only write the CGI upload file for a variant file")
                .arg(input_arg())
                .arg(output_arg())
                .arg(outdir_arg()),
        )
}
