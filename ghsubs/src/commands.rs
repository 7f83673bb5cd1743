use crate::CLAP_STYLING;
use clap::builder::RangedU64ValueParser;
use clap::{Arg, arg, command};
use ghsubs_core::scratch::DEFAULT_SCRATCH_DIR;

fn domain_arg() -> Arg {
    arg!(-d --"domain" <DOMAIN>)
        .required(true)
        .help("Target domain, e.g. example.com")
}

fn output_arg() -> Arg {
    arg!(-o --"output" <PATH>)
        .required(false)
        .help("File to save extracted subdomains (default: print to screen)")
        .value_parser(clap::value_parser!(std::path::PathBuf))
}

fn scratch_arg() -> Arg {
    arg!(--"scratch-dir" <PATH>)
        .required(false)
        .help("Working directory for the link file and downloaded files")
        .default_value(DEFAULT_SCRATCH_DIR)
}

fn token_arg() -> Arg {
    arg!(--"token" <TOKEN>)
        .required(false)
        .help("GitHub token used for code search")
        .env("GITHUB_TOKEN")
        .hide_env_values(true)
}

fn delay_arg() -> Arg {
    arg!(--"delay" <MILLIS>)
        .required(false)
        .help("Pause between search pages, in milliseconds")
        .value_parser(clap::value_parser!(u64))
        .default_value("1500")
}

fn threads_arg() -> Arg {
    arg!(-t --"threads" <NUM_WORKERS>)
        .required(false)
        .help("Number of parallel downloads. Keep this low to avoid abuse detection.")
        .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
        .default_value("2")
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("ghsubs")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("ghsubs")
        .about("Find subdomains by mining GitHub code search results")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" ... "Increase log verbosity (-v info, -vv debug)")
                .required(false),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("scan")
                .about("Search, download and extract in one run")
                .arg(domain_arg())
                .arg(output_arg())
                .arg(threads_arg())
                .arg(token_arg())
                .arg(delay_arg())
                .arg(scratch_arg()),
        )
        .subcommand(
            command!("search")
                .about("Search code for the domain and save the result links")
                .arg(domain_arg())
                .arg(token_arg())
                .arg(delay_arg())
                .arg(scratch_arg()),
        )
        .subcommand(
            command!("fetch")
                .about("Download every file listed in the saved link file")
                .arg(threads_arg())
                .arg(scratch_arg()),
        )
        .subcommand(
            command!("extract")
                .about("Extract subdomains from previously downloaded files")
                .arg(domain_arg())
                .arg(output_arg())
                .arg(scratch_arg()),
        )
}
