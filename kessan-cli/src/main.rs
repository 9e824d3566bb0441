use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kessan_core::{BatchError, SourceSchema};
use kessan_ingest::SourceFile;
use kessan_profit::Engine;
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod render;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "kessan",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("KESSAN_BUILD_SHA"), ")"),
    about = "Monthly profit report from marketplace sales exports"
)]
struct Cli {
    /// Config file (default: ~/.kessan/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the monthly profit report
    Compute {
        /// Export to read, as <schema>:<slot>:<path> (e.g. makado:A_M:june.csv)
        #[arg(long = "file", required = true, value_parser = parse_file_spec)]
        files: Vec<FileSpec>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Parse and normalise only; print what would be excluded
    Validate {
        #[arg(long = "file", required = true, value_parser = parse_file_spec)]
        files: Vec<FileSpec>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config (to --config, or ~/.kessan/config.toml)
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileSpec {
    schema: SourceSchema,
    slot: String,
    path: PathBuf,
}

fn parse_file_spec(s: &str) -> Result<FileSpec, String> {
    let mut parts = s.splitn(3, ':');
    let (Some(schema), Some(slot), Some(path)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected <schema>:<slot>:<path>, got '{s}'"));
    };
    if slot.trim().is_empty() || path.is_empty() {
        return Err(format!("expected <schema>:<slot>:<path>, got '{s}'"));
    }
    Ok(FileSpec {
        schema: schema.parse()?,
        slot: slot.to_string(),
        path: PathBuf::from(path),
    })
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_files(specs: &[FileSpec]) -> Result<Vec<SourceFile>> {
    specs
        .iter()
        .map(|spec| {
            let bytes = std::fs::read(&spec.path)
                .with_context(|| format!("read {}", spec.path.display()))?;
            Ok(SourceFile::new(
                spec.path.display().to_string(),
                bytes,
                spec.schema,
                &spec.slot,
            ))
        })
        .collect()
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Compute { files, format } => {
            let engine = Engine::new(config::load_config(cli.config.as_deref())?);
            let sources = read_files(&files)?;
            match engine.compute(&sources) {
                Ok(report) => match format {
                    Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                    Format::Text => print!("{}", render::report(&report)),
                },
                Err(BatchError::NoValidData { files, diagnostics }) => {
                    eprintln!("No valid data: all {files} file(s) were rejected");
                    for d in &diagnostics {
                        eprintln!("  {}", render::diagnostic_line(d));
                    }
                    return Ok(ExitCode::from(2));
                }
                Err(e) => return Err(e).context("compute report"),
            }
        }

        Command::Validate { files, format } => {
            let engine = Engine::new(config::load_config(cli.config.as_deref())?);
            let sources = read_files(&files)?;
            let diagnostics = engine.validate(&sources);
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&diagnostics)?),
                Format::Text if diagnostics.is_empty() => {
                    println!("{} file(s) OK", sources.len())
                }
                Format::Text => {
                    for d in &diagnostics {
                        println!("{}", render::diagnostic_line(d));
                    }
                }
            }
            if !diagnostics.is_empty() {
                return Ok(ExitCode::from(1));
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(cli.config.as_deref())?,
        },
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_spec() {
        let spec = parse_file_spec("makado:A_M:exports/june.csv").unwrap();
        assert_eq!(spec.schema, SourceSchema::Makado);
        assert_eq!(spec.slot, "A_M");
        assert_eq!(spec.path, PathBuf::from("exports/june.csv"));

        // Only the first two colons split.
        let spec = parse_file_spec("hanro_plus:o_aa:C:/data/h.csv").unwrap();
        assert_eq!(spec.schema, SourceSchema::HanroPlus);
        assert_eq!(spec.path, PathBuf::from("C:/data/h.csv"));
    }

    #[test]
    fn test_parse_file_spec_errors() {
        assert!(parse_file_spec("makado:A_M").is_err());
        assert!(parse_file_spec("makado::x.csv").is_err());
        assert!(parse_file_spec("shopify:A_M:x.csv").is_err());
    }

    #[test]
    fn test_cli_parses_compute() {
        let cli = Cli::try_parse_from([
            "kessan",
            "-v",
            "compute",
            "--file",
            "makado:A_M:a.csv",
            "--file",
            "mercari:O_AA:b.csv",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Compute { files, format } => {
                assert_eq!(files.len(), 2);
                assert_eq!(files[1].schema, SourceSchema::MercariShop);
                assert_eq!(format, Format::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_compute_requires_a_file() {
        assert!(Cli::try_parse_from(["kessan", "compute"]).is_err());
    }
}
