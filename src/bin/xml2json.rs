use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use xml_to_json::{ConvertOptions, ProjectOptions, ReadOptions, DEFAULT_MAX_DEPTH};

#[derive(Debug, Parser)]
#[command(name = "xml2json", version, about = "Convert a xml document to json")]
struct Args {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Indent the json output
    #[arg(short, long)]
    pretty: bool,
    /// Fail on malformed xml instead of converting the elements read so far
    #[arg(long)]
    strict: bool,
    /// Concatenate every text run of an element instead of keeping the last one
    #[arg(long)]
    join_text: bool,
    /// Deepest element nesting read before stopping
    #[arg(long, value_name = "DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
    /// Add "_objectName" to objects of elements with children
    #[arg(long)]
    object_name: bool,
    /// More logging on stderr, repeat for trace output (RUST_LOG overrides)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl From<&Args> for ConvertOptions {
    fn from(args: &Args) -> Self {
        ConvertOptions {
            read: ReadOptions {
                strict: args.strict,
                join_text_runs: args.join_text,
                max_depth: args.max_depth,
            },
            project: ProjectOptions {
                object_name_key: args.object_name,
            },
            pretty: args.pretty,
        }
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let input_data = read_input(&args.input)?;
    let output = xml_to_json::convert_with_opts(&input_data, &ConvertOptions::from(&args))
        .context("failed to convert xml")?;

    write_output(&args.output, &output)?;
    Ok(())
}

fn read_input(path: &Option<PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => xml_to_json::read_input(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            stdout.write_all(b"\n").context("failed to write stdout")?;
            Ok(())
        }
    }
}
