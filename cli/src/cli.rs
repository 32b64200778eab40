//! CLI argument definitions for the bug tracker client.

use bugtracker_core::{BugStatus, Priority};
use clap::{Args, Parser, Subcommand};

/// Talk to a bug tracker backend: CRUD on bugs plus connection diagnostics.
#[derive(Parser, Debug)]
#[command(name = "bugtracker")]
#[command(author, version, about = "Resilient client for the bug tracker API", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true, env = "BUGTRACKER_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Commands,
}

/// Signals that decide which backend is targeted.
#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
    /// Backend base URL; "/api" is appended when missing
    #[arg(long, global = true, env = "API_BASE_URL")]
    pub base_url: Option<String>,

    /// Host the client is served from (hosting-platform detection)
    #[arg(long, global = true, env = "APP_HOSTNAME")]
    pub hostname: Option<String>,

    /// Deployment environment; "production" implies --strict
    #[arg(long, global = true, env = "APP_ENV")]
    pub app_env: Option<String>,

    /// Refuse to guess a backend when --base-url is missing
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List bugs, optionally filtered and sorted
    List {
        /// Only bugs with this status (open, in-progress, resolved)
        #[arg(long)]
        status: Option<String>,

        /// Only bugs with this priority (low, medium, high)
        #[arg(long)]
        priority: Option<String>,

        /// Sort key, e.g. "-createdAt" or "priority"
        #[arg(long)]
        sort: Option<String>,
    },

    /// Show a single bug
    Get {
        /// Bug ID
        id: String,
    },

    /// Report a new bug
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        status: Option<BugStatus>,

        #[arg(long)]
        priority: Option<Priority>,

        #[arg(long)]
        reporter: Option<String>,
    },

    /// Change fields of an existing bug
    Update {
        /// Bug ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        status: Option<BugStatus>,

        #[arg(long)]
        priority: Option<Priority>,

        #[arg(long)]
        reporter: Option<String>,
    },

    /// Delete a bug
    Delete {
        /// Bug ID
        id: String,
    },

    /// Probe the backend health route
    Health {
        /// Probe timeout in milliseconds
        #[arg(long = "probe-timeout-ms", default_value_t = 5_000)]
        probe_timeout_ms: u64,
    },

    /// Run the read-only connection checks
    Verify {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn create_parses_typed_status_and_priority() {
        let cli = Cli::try_parse_from([
            "bugtracker",
            "create",
            "--title",
            "Crash",
            "--status",
            "in-progress",
            "--priority",
            "high",
        ])
        .unwrap();
        match cli.command {
            Commands::Create {
                title,
                status,
                priority,
                ..
            } => {
                assert_eq!(title, "Crash");
                assert_eq!(status, Some(BugStatus::InProgress));
                assert_eq!(priority, Some(Priority::High));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn create_rejects_unknown_status() {
        let result =
            Cli::try_parse_from(["bugtracker", "create", "--title", "x", "--status", "wontfix"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "bugtracker",
            "get",
            "42",
            "--base-url",
            "http://localhost:5000",
            "--strict",
        ])
        .unwrap();
        assert_eq!(cli.endpoint.base_url.as_deref(), Some("http://localhost:5000"));
        assert!(cli.endpoint.strict);
    }
}
