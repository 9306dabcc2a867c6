use clickflow::commands::command_argument_builder;
use clickflow::handlers::{handle_render, init_tracing};
use colored::Colorize;

fn main() {
    let cmd = command_argument_builder();
    let matches = cmd.get_matches();

    init_tracing(matches.get_count("verbose"));

    if let Err(e) = handle_render(&matches) {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
