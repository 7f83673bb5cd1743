use colored::Colorize;
use ghsubs::command_argument_builder;
use ghsubs::handlers::{handle_extract, handle_fetch, handle_scan, handle_search, init_tracing};
use ghsubs_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_tracing(chosen_command.get_count("verbose"));

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("scan", primary_command)) => handle_scan(primary_command, quiet).await,
        Some(("search", primary_command)) => handle_search(primary_command, quiet).await,
        Some(("fetch", primary_command)) => handle_fetch(primary_command, quiet).await,
        Some(("extract", primary_command)) => handle_extract(primary_command, quiet),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
