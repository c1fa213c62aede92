//! Command-line front end for the request dispatcher.
//!
//! Issues one GET or POST and prints the response envelope as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use request_dispatcher::config::{load_config, DispatchConfig, Phase, TimeoutPolicy};
use request_dispatcher::observability::logging;
use request_dispatcher::{Dispatcher, Method, RequestBuilder};

#[derive(Parser)]
#[command(name = "request-dispatcher")]
#[command(about = "Issue one HTTP request and print the normalized response", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Endpoint phase used for relative targets
    #[arg(short, long)]
    phase: Option<Phase>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get(RequestArgs),
    /// Send a POST request
    Post {
        #[command(flatten)]
        request: RequestArgs,

        /// JSON body
        #[arg(short, long)]
        body: Option<String>,
    },
}

#[derive(clap::Args)]
struct RequestArgs {
    /// Absolute URL or path relative to the phase endpoint
    target: String,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "query", value_parser = parse_pair)]
    query: Vec<(String, String)>,

    /// Header as 'Name: value' (repeatable). Replaces the default headers.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Send Cache-Control: no-cache
    #[arg(long)]
    no_cache: bool,

    /// Timeout in milliseconds; 0 or negative waits forever
    #[arg(short, long, allow_hyphen_values = true)]
    timeout_ms: Option<i64>,

    /// Drop the in-flight request on timeout instead of letting it finish
    #[arg(long)]
    abort_on_timeout: bool,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", s))
}

fn build_request(method: Method, args: RequestArgs, phase: Option<Phase>) -> RequestBuilder {
    let mut builder = RequestBuilder::new(method, args.target).queries(args.query);

    if !args.headers.is_empty() {
        builder = builder.headers(args.headers);
    }
    if args.no_cache {
        builder = builder.ignore_cache(true);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        builder = builder.timeout_ms(timeout_ms);
    }
    if args.abort_on_timeout {
        builder = builder.timeout_policy(TimeoutPolicy::Abort);
    }
    if let Some(phase) = phase {
        builder = builder.phase(phase);
    }
    builder
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DispatchConfig::default(),
    };

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("Logging disabled: {}", e);
    }

    tracing::debug!(
        phase = ?config.endpoints.phase,
        timeout_ms = config.defaults.timeout_ms,
        "Configuration loaded"
    );

    let dispatcher = Dispatcher::new(&config)?;

    let builder = match cli.command {
        Commands::Get(args) => build_request(Method::Get, args, cli.phase),
        Commands::Post { request, body } => {
            let builder = build_request(Method::Post, request, cli.phase);
            match body {
                Some(raw) => builder.body(serde_json::from_str(&raw)?),
                None => builder,
            }
        }
    };

    let response = dispatcher.send(builder).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.ok())
}

/// Process status for a run: 0 on a successful response, 1 when the response
/// is not ok, 2 when the request could not be made at all.
fn exit_status(result: &Result<bool, Box<dyn std::error::Error>>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = &result {
        eprintln!("Error: {}", e);
    }
    ExitCode::from(exit_status(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_post_command() {
        let cli = Cli::try_parse_from([
            "request-dispatcher",
            "--phase",
            "real",
            "post",
            "player/1/init",
            "-q",
            "a=1",
            "-H",
            "X-Token: abc",
            "--timeout-ms",
            "-1",
            "--body",
            r#"{"name":"HWANG"}"#,
        ])
        .unwrap();

        assert_eq!(cli.phase, Some(Phase::Real));
        match cli.command {
            Commands::Post { request, body } => {
                assert_eq!(request.target, "player/1/init");
                assert_eq!(request.query, vec![("a".to_string(), "1".to_string())]);
                assert_eq!(request.headers, vec![("X-Token".to_string(), "abc".to_string())]);
                assert_eq!(request.timeout_ms, Some(-1));
                assert_eq!(body.as_deref(), Some(r#"{"name":"HWANG"}"#));
            }
            Commands::Get(_) => panic!("expected post"),
        }
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_pair("k=v=w"), Ok(("k".into(), "v=w".into())));
        assert!(parse_pair("novalue").is_err());
        assert_eq!(parse_header("Accept:  text/plain "), Ok(("Accept".into(), "text/plain".into())));
        assert!(parse_header("broken").is_err());
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&Ok(true)), 0);
        assert_eq!(exit_status(&Ok(false)), 1);

        let err: Box<dyn std::error::Error> = "config missing".into();
        assert_eq!(exit_status(&Err(err)), 2);
    }
}
