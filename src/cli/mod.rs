//! CLI argument parsing module
//!
//! This module handles command-line argument parsing and drives a single
//! `RequestBuilder` from the parsed arguments.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tokio::sync::mpsc;

use crate::config::TransportConfig;
use crate::error::{FluentReqError, Result};
use crate::exit_code::{exit_code_for_error, exit_code_for_failure};
use crate::http::{RequestBuilder, ReqwestTransport, Response};
use crate::logging;
use crate::output::{format_json, OutputWriter};
use crate::utils::{StringUtils, UrlUtils};

/// Main entry point for the CLI application
pub fn run() {
    let matches = create_app().get_matches();

    if matches.get_flag("debug") {
        logging::init_verbose();
    } else {
        logging::init();
    }

    let code = match run_with_args(&matches) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fluentreq: error: {}", e);
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

enum Outcome {
    Success(Response),
    Failure(Response),
}

/// Run with parsed command line arguments, returning the exit code
fn run_with_args(matches: &ArgMatches) -> Result<i32> {
    let transport_config = build_transport_config(matches)?;
    let builder = build_request_from_args(matches)?;
    let writer = OutputWriter::new(matches.get_one::<String>("output").map(PathBuf::from));
    let pretty_json = matches.get_flag("json");

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| FluentReqError::Runtime(format!("Failed to create async runtime: {}", e)))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let success_tx = tx.clone();

    rt.block_on(async {
        let transport = ReqwestTransport::new(&transport_config)?;
        builder
            .with_transport(Arc::new(transport))
            .with_on_error(move |response| {
                let _ = tx.send(Outcome::Failure(response));
            })
            .send(move |response| {
                let _ = success_tx.send(Outcome::Success(response));
            })
            .await;
        Ok::<(), FluentReqError>(())
    })?;

    match rx.try_recv() {
        Ok(outcome) => report_outcome(outcome, &writer, pretty_json),
        Err(_) => Err(FluentReqError::Runtime(
            "request completed without an outcome".to_string(),
        )),
    }
}

/// Write a successful body; a failure was already logged as a warning by
/// the builder, so only its exit code is derived here.
fn report_outcome(outcome: Outcome, writer: &OutputWriter, pretty_json: bool) -> Result<i32> {
    match outcome {
        Outcome::Success(response) => {
            if pretty_json {
                writer.write(&format_json(&response.body_json()?)?)?;
            } else {
                writer.write(response.body())?;
            }
            Ok(0)
        }
        Outcome::Failure(response) => Ok(exit_code_for_failure(&response)),
    }
}

/// Create the CLI application structure
pub fn create_app() -> Command {
    Command::new("fluentreq")
        .version(crate::VERSION)
        .about("Issue one HTTP request from a URL template")
        .arg(Arg::new("url")
            .help("URL template; {name} and :name placeholders are filled from --param")
            .required(true)
            .index(1))
        .arg(Arg::new("param")
            .short('p')
            .long("param")
            .value_name("NAME=VALUE")
            .help("Value for a URL placeholder")
            .action(ArgAction::Append))
        .arg(Arg::new("query")
            .short('q')
            .long("query")
            .value_name("NAME=VALUE")
            .help("Append a query parameter")
            .action(ArgAction::Append))
        .arg(Arg::new("request")
            .short('X')
            .long("request")
            .value_name("METHOD")
            .help("HTTP request method"))
        .arg(Arg::new("header")
            .short('H')
            .long("header")
            .value_name("HEADER")
            .help("Add custom HTTP header")
            .action(ArgAction::Append))
        .arg(Arg::new("bearer")
            .long("bearer")
            .value_name("TOKEN")
            .env("FLUENTREQ_TOKEN")
            .help("Send an authorization bearer token"))
        .arg(Arg::new("data")
            .short('d')
            .long("data")
            .value_name("DATA")
            .help("Raw request body")
            .conflicts_with("json-data"))
        .arg(Arg::new("json-data")
            .long("json-data")
            .value_name("JSON")
            .help("JSON request body, sent as application/json"))
        .arg(Arg::new("json")
            .long("json")
            .help("Parse the response as JSON and pretty-print it")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("debug")
            .long("debug")
            .help("Debug mode: log bodies and alert on failure")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FILE")
            .help("Write output to file"))
        .arg(Arg::new("base-url")
            .long("base-url")
            .value_name("URL")
            .env("FLUENTREQ_BASE_URL")
            .help("Base URL for relative templates"))
        .arg(Arg::new("user-agent")
            .short('A')
            .long("user-agent")
            .value_name("STRING")
            .help("User-Agent header"))
        .arg(Arg::new("proxy")
            .short('x')
            .long("proxy")
            .value_name("[PROTOCOL://]HOST[:PORT]")
            .help("Use proxy server"))
        .arg(Arg::new("insecure")
            .short('k')
            .long("insecure")
            .help("Allow insecure SSL connections")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("no-location")
            .long("no-location")
            .help("Do not follow redirects")
            .action(ArgAction::SetTrue))
}

/// Build the request builder from command line arguments
pub fn build_request_from_args(matches: &ArgMatches) -> Result<RequestBuilder> {
    let template = matches
        .get_one::<String>("url")
        .ok_or_else(|| FluentReqError::Config("URL template is required".to_string()))?;

    let params = parse_pairs(matches, "param")?;
    let mut builder = RequestBuilder::new(template, params)?;

    let query = parse_pairs(matches, "query")?;
    if !query.is_empty() {
        builder = builder.with_params(query);
    }

    if let Some(headers) = matches.get_many::<String>("header") {
        let headers = headers
            .map(|header| StringUtils::parse_header(header))
            .collect::<Result<Vec<_>>>()?;
        builder = builder.with_headers(headers);
    }

    if let Some(token) = matches.get_one::<String>("bearer") {
        builder = builder.with_bearer_token(token);
    }

    if let Some(data) = matches.get_one::<String>("data") {
        builder = builder.with_body(data.as_str());
    }

    if let Some(json) = matches.get_one::<String>("json-data") {
        let value: serde_json::Value = serde_json::from_str(json)?;
        builder = builder.with_body(value);
    }

    // Explicit method is applied after the body so it is never overridden
    if let Some(method) = matches.get_one::<String>("request") {
        builder = builder.with_method(method.to_uppercase());
    }

    if matches.get_flag("debug") {
        builder = builder.with_debug();
    }

    Ok(builder)
}

/// Build the transport configuration from command line arguments
pub fn build_transport_config(matches: &ArgMatches) -> Result<TransportConfig> {
    let mut config = TransportConfig::default();

    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = Some(UrlUtils::validate_base_url(base_url)?.to_string());
    }

    if let Some(user_agent) = matches.get_one::<String>("user-agent") {
        config.user_agent = Some(user_agent.clone());
    }

    if let Some(proxy) = matches.get_one::<String>("proxy") {
        config.proxy = Some(proxy.clone());
    }

    config.verify_certs = !matches.get_flag("insecure");
    config.follow_redirects = !matches.get_flag("no-location");

    Ok(config)
}

fn parse_pairs(matches: &ArgMatches, id: &str) -> Result<Vec<(String, String)>> {
    match matches.get_many::<String>(id) {
        Some(values) => values.map(|value| StringUtils::parse_pair(value)).collect(),
        None => Ok(Vec::new()),
    }
}
