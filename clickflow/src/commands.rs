use clap::{ArgAction, arg};
use clickflow_core::render::{DEFAULT_LINK_BASE, DEFAULT_SUBJECT};
use clickflow_logs::reader::DEFAULT_STRIP_PREFIX;
use url::Url;

pub const DEFAULT_INPUT_FILENAME: &str = "logs.csv";
pub const DEFAULT_LIMIT: usize = 10;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("clickflow")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("clickflow")
        .styles(CLAP_STYLING)
        .about(
            "Reads a clickstream log, builds the screen-transition graph and prints its most \
            visited part as a Graphviz digraph.",
        )
        .arg(
            arg!(-i --"input-filename" <PATH>)
                .required(false)
                .help("CSV file to read")
                .default_value(DEFAULT_INPUT_FILENAME),
        )
        .arg(
            arg!(-l --"limit" <COUNT>)
                .required(false)
                .help(format!(
                    "Amount of screens to display, not counting start and end (default: {})",
                    DEFAULT_LIMIT
                ))
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--"strip-prefix" <PREFIX>)
                .required(false)
                .help("Text removed from every screen path")
                .default_value(DEFAULT_STRIP_PREFIX),
        )
        .arg(
            arg!(--"link-base" <URL>)
                .required(false)
                .help(format!(
                    "Base URL that node links point into (default: {})",
                    DEFAULT_LINK_BASE
                ))
                .value_parser(clap::value_parser!(Url)),
        )
        .arg(
            arg!(--"subject" <TEXT>)
                .required(false)
                .help(format!(
                    "What the clicks are of, shown in the graph title (default: {})",
                    DEFAULT_SUBJECT
                )),
        )
        .arg(
            arg!(--"bands" <PATH>)
                .required(false)
                .help("JSON file with node/edge color bands, link base and subject")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Output format: dot, json")
                .value_parser(["dot", "json"])
                .default_value("dot"),
        )
        .arg(arg!(-q --"quiet" "Suppress diagnostics on stderr").required(false))
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (repeatable)")
                .required(false)
                .action(ArgAction::Count),
        )
}
