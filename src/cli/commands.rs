use crate::dispatcher::{Dispatcher, Resolution};
use crate::operation::{load_manifest, DescriptorIssue, OperationDescriptor};
use crate::router::PathMatchOptions;
use crate::runtime_config::RuntimeConfig;
use crate::server::Request;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use http::Method;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Command-line interface for restwire
///
/// Inspects operation manifests and probes the matching algorithm without running
/// any handler.
#[derive(Parser)]
#[command(name = "restwire")]
#[command(about = "restwire operation manifest tools", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List registered operations in matching order
    Routes {
        /// Path to the operation manifest (YAML, TOML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,
    },
    /// Validate every operation; exits non-zero on problems
    Check {
        /// Path to the operation manifest (YAML, TOML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,
    },
    /// Match one request against the manifest and report the outcome
    Probe {
        /// Path to the operation manifest (YAML, TOML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// HTTP method of the probed request
        #[arg(long, default_value = "GET")]
        method: String,

        /// Request target, may include a query string and matrix parameters
        #[arg(short, long)]
        path: String,

        /// Request header as `Name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

/// One line per operation: methods, template, handler and media types.
#[must_use]
pub fn render_routes(descriptors: &[OperationDescriptor]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[routes] count={}", descriptors.len());
    for d in descriptors {
        let methods: Vec<&str> = d.http_methods.iter().map(Method::as_str).collect();
        let consumes: Vec<&str> = d.consumed_media_types.iter().collect();
        let produces: Vec<&str> = d.produced_media_types.iter().collect();
        let _ = writeln!(
            out,
            "[route] {} {} -> {} consumes={:?} produces={:?}",
            if methods.is_empty() { "-".to_string() } else { methods.join(",") },
            d.resource_path,
            d.handler,
            consumes,
            produces
        );
    }
    out
}

/// Every configuration problem across `descriptors`, templates compiled with `options`.
#[must_use]
pub fn check_descriptors(
    descriptors: &[OperationDescriptor],
    options: PathMatchOptions,
) -> Vec<DescriptorIssue> {
    descriptors
        .iter()
        .flat_map(|d| d.validate_with(options))
        .collect()
}

fn parse_header(raw: &str) -> anyhow::Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Header '{raw}' is not in 'Name: value' form"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("Header '{raw}' has an empty name");
    }
    Ok((name, value.trim()))
}

/// Describe how `descriptors` would dispatch the given request.
pub fn probe(
    descriptors: Vec<OperationDescriptor>,
    method: &str,
    target: &str,
    headers: &[String],
) -> anyhow::Result<String> {
    let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{method}'"))?;

    let mut dispatcher = Dispatcher::new(RuntimeConfig::from_env());
    dispatcher.register_endpoints(descriptors)?;

    let mut builder = Request::builder(method, target);
    for raw in headers {
        let (name, value) = parse_header(raw)?;
        builder = builder.header(name, value);
    }
    let request = builder.build();

    let mut out = String::new();
    match dispatcher.resolve(&request) {
        Resolution::Matched(selection) => {
            let _ = writeln!(out, "matched: {}", selection.descriptor().handler);
            let _ = writeln!(out, "template: {}", selection.operation.matcher().template());
            for (name, value) in &selection.path_params {
                let _ = writeln!(out, "path param: {name}={value}");
            }
            let _ = writeln!(out, "media type: {}", selection.media_type);
        }
        Resolution::Fallback(status, result) => {
            let _ = writeln!(out, "no match: {status}");
            let _ = writeln!(out, "matching: {result:?}");
        }
    }
    Ok(out)
}

/// Run the parsed command, printing to stdout.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Routes { manifest } => {
            let descriptors = load_manifest(&manifest)?;
            print!("{}", render_routes(&descriptors));
            Ok(())
        }
        Commands::Check { manifest } => {
            let descriptors = load_manifest(&manifest)?;
            let issues = check_descriptors(&descriptors, RuntimeConfig::from_env().path_matching);
            if issues.is_empty() {
                println!("{} operations OK", descriptors.len());
                return Ok(());
            }
            for issue in &issues {
                println!("{issue}");
            }
            bail!("{} problem(s) found in {}", issues.len(), manifest.display())
        }
        Commands::Probe {
            manifest,
            method,
            path,
            headers,
        } => {
            let descriptors = load_manifest(&manifest)?;
            print!("{}", probe(descriptors, &method, &path, &headers)?);
            Ok(())
        }
    }
}
