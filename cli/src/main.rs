//! bugtracker - command-line client for the bug tracker API.

mod cli;

use std::process::ExitCode;
use std::time::Duration;

use bugtracker_core::endpoint::is_production;
use bugtracker_core::{
    ApiError, BugFilters, BugService, ClientConfig, ConnectionTestReport, CreateBug, Environment,
    HealthReport, ResolveMode, UpdateBug, UreqTransport,
};
use clap::Parser;
use serde::Serialize;

use crate::cli::{Cli, Commands, EndpointArgs};

type Service = BugService<UreqTransport, Environment>;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config =
        ClientConfig::default().with_request_timeout(Duration::from_millis(cli.timeout_ms));
    if let Commands::Health { probe_timeout_ms } = &cli.command {
        config = config.with_health_timeout(Duration::from_millis(*probe_timeout_ms));
    }
    let service = build_service(&cli.endpoint, config);

    match run(&service, cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Environment snapshot from flags; clap has already folded in the
/// matching environment variables.
fn environment(args: &EndpointArgs) -> Environment {
    Environment {
        override_url: args.base_url.clone(),
        hostname: args.hostname.clone(),
        production: args.app_env.as_deref().is_some_and(is_production),
    }
}

fn build_service(args: &EndpointArgs, config: ClientConfig) -> Service {
    let mode = if args.strict {
        ResolveMode::Strict
    } else {
        ResolveMode::Auto
    };
    BugService::new(UreqTransport::new(), environment(args), config.with_mode(mode))
}

fn run(service: &Service, command: Commands) -> Result<ExitCode, ApiError> {
    match command {
        Commands::List {
            status,
            priority,
            sort,
        } => {
            let filters = BugFilters::from_pairs([
                ("status", status.unwrap_or_default()),
                ("priority", priority.unwrap_or_default()),
                ("sort", sort.unwrap_or_default()),
            ]);
            print_json(&service.list(&filters)?)
        }
        Commands::Get { id } => print_json(&service.get_by_id(&id)?),
        Commands::Create {
            title,
            description,
            status,
            priority,
            reporter,
        } => {
            let input = CreateBug {
                status,
                priority,
                reporter,
                ..CreateBug::new(title, description)
            };
            print_json(&service.create(&input)?)
        }
        Commands::Update {
            id,
            title,
            description,
            status,
            priority,
            reporter,
        } => {
            let patch = UpdateBug {
                title,
                description,
                status,
                priority,
                reporter,
            };
            if patch.is_empty() {
                log::warn!("update for {id} carries no fields");
            }
            print_json(&service.update(&id, &patch)?)
        }
        Commands::Delete { id } => {
            service.remove(&id)?;
            println!("deleted {id}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Health { .. } => {
            let url = service.endpoint()?.health_url();
            let report = service.probe_health()?;
            println!("{}", health_line(&report, &url));
            Ok(exit_code(report.reachable))
        }
        Commands::Verify { json } => {
            let report = service.run_connection_tests()?;
            if json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
            Ok(exit_code(report.overall))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<ExitCode, ApiError> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| ApiError::Serialization(e.to_string()))?;
    println!("{text}");
    Ok(ExitCode::SUCCESS)
}

fn health_line(report: &HealthReport, url: &str) -> String {
    if report.reachable {
        let environment = report
            .details()
            .and_then(|d| d.environment)
            .map(|env| format!(" ({env})"))
            .unwrap_or_default();
        format!("ok   {url} responded in {}ms{environment}", report.elapsed_ms)
    } else {
        let reason = report.failure_reason.as_deref().unwrap_or("unreachable");
        format!("FAIL {url}: {reason}")
    }
}

fn print_report(report: &ConnectionTestReport) {
    println!("endpoint: {}", report.endpoint_used);
    for check in &report.checks {
        let mark = if check.success { "ok  " } else { "FAIL" };
        println!("{mark} {} ({}): {}", check.name, check.endpoint, check.message);
    }
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
