use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use fescall_core::logging::{self, LogSettings};
use fescall_core::{Config, Domain, OutputFormat};
use fescall_engine::{Dispatcher, FunctionRegistry, OutputFormatter, RunReport, registry_for};

const USAGE: &str = "Usage: fescall [OPTIONS] <FILE>";

/// fescall - execute `CALL: name(args)` directives found in text
#[derive(Parser, Debug)]
#[command(name = "fescall")]
#[command(about = "Run the CALL: directives embedded in a text file", long_about = None)]
#[command(version)]
struct Cli {
    /// Text file to scan, or `-` for standard input
    #[arg(value_name = "FILE", required_unless_present_any = ["list", "print_config"])]
    file: Option<PathBuf>,

    /// Path to fescall.toml
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Capability domain to enable (repeatable; default: all)
    #[arg(short, long = "domain", value_name = "DOMAIN", value_parser = parse_domain)]
    domains: Vec<Domain>,

    /// Output format: text or json
    #[arg(short, long, value_name = "FORMAT", value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// List the available capabilities and exit
    #[arg(long)]
    list: bool,

    /// Print an example fescall.toml and exit
    #[arg(long)]
    print_config: bool,

    /// Verbose (debug) logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_domain(s: &str) -> std::result::Result<Domain, String> {
    Domain::from_str(s).map_err(|e| e.to_string())
}

fn parse_format(s: &str) -> std::result::Result<OutputFormat, String> {
    OutputFormat::from_str(s).map_err(|e| e.to_string())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if is_input_error(&e) {
            eprintln!("{}", USAGE);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.print_config {
        print!("{}", Config::example());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    let mut log_settings = LogSettings::from_config(&config.logging)?;
    if cli.verbose {
        log_settings = log_settings.with_level("debug");
    }
    let _log_guard = logging::init_logging(log_settings)?;

    let registry = build_registry(&cli, &config)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if cli.list {
        for line in list_capabilities(&registry) {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;
        return Ok(());
    }

    let path = cli.file.as_deref().context("no input file given")?;
    tracing::debug!(path = %logging::sanitize_path(path), "reading input");
    let text = read_input(path)?;

    let format = cli.format.unwrap_or(config.output.format);
    let formatter = OutputFormatter::new(config.output.truncate_length);
    let report = Dispatcher::new(registry).run(&text);

    for line in render(&report, format, &formatter)? {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;

    Ok(())
}

/// Load config from the given file, or use defaults when none is given
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path).with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Build the registry for the domains selected on the command line or in config
fn build_registry(cli: &Cli, config: &Config) -> Result<FunctionRegistry> {
    let domains = if cli.domains.is_empty() { &config.capabilities.domains } else { &cli.domains };
    let registry = registry_for(domains, &config.capabilities).context("Failed to build capability registry")?;
    tracing::debug!(functions = registry.count(), "registry ready");
    Ok(registry)
}

/// Read the whole source text; `-` means standard input
fn read_input(path: &Path) -> fescall_core::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| fescall_core::Error::input(path, e))?;
        return Ok(text);
    }

    std::fs::read_to_string(path).map_err(|e| fescall_core::Error::input(path, e))
}

/// Render every record of a run in the chosen format
fn render(report: &RunReport, format: OutputFormat, formatter: &OutputFormatter) -> Result<Vec<String>> {
    report
        .iter()
        .map(|record| match format {
            OutputFormat::Text => Ok(formatter.format(record)),
            OutputFormat::Json => Ok(formatter.format_json(record)?),
        })
        .collect()
}

/// `name(kind)  description`, sorted by name
fn list_capabilities(registry: &FunctionRegistry) -> Vec<String> {
    let specs = registry.specs();
    let width = specs.iter().map(|s| s.signature().len()).max().unwrap_or(0);
    specs
        .iter()
        .map(|spec| format!("{:<width$}  {}", spec.signature(), spec.description(), width = width))
        .collect()
}

fn is_input_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<fescall_core::Error>().is_some_and(|e| e.is_input())
}
