mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use flexprims_layout::{Limits, DEFAULT_SANITY_CEILING};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "flexprims", version, about = "Flexible record inspection and packing")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "FLEXPRIMS_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    /// Largest byte span any operation will read or write.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_SANITY_CEILING, global = true)]
    ceiling: usize,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let limits = Limits::with_ceiling(cli.ceiling);
    let result = cmd::run(cli.command, format, &limits);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_size_subcommand() {
        let cli = Cli::try_parse_from([
            "flexprims",
            "size",
            "--element-size",
            "4",
            "--count",
            "13",
        ])
        .expect("size args should parse");

        assert!(matches!(cli.command, Command::Size(_)));
        assert_eq!(cli.ceiling, DEFAULT_SANITY_CEILING);
    }

    #[test]
    fn size_accepts_negative_count() {
        let cli = Cli::try_parse_from([
            "flexprims",
            "size",
            "--element-size",
            "4",
            "--count",
            "-1",
        ])
        .expect("negative count should reach the size check");

        match cli.command {
            Command::Size(args) => assert_eq!(args.count, -1),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn pack_requires_count() {
        let err = Cli::try_parse_from([
            "flexprims",
            "pack",
            "/tmp/elements.bin",
            "--element-size",
            "4",
        ])
        .expect_err("missing count should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_unknown_count_width() {
        let err = Cli::try_parse_from([
            "flexprims",
            "inspect",
            "/tmp/record.bin",
            "--element-size",
            "4",
            "--count-width",
            "24",
        ])
        .expect_err("24-bit count should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn global_ceiling_after_subcommand() {
        let cli = Cli::try_parse_from([
            "flexprims",
            "inspect",
            "/tmp/record.bin",
            "--element-size",
            "2",
            "--ceiling",
            "64",
        ])
        .expect("ceiling is global");

        assert_eq!(cli.ceiling, 64);
    }
}
