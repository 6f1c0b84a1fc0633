use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI client for polling analysis frames from a CyteView acquisition
/// service.
#[derive(Parser, Debug)]
#[command(
    name = "cyteview",
    version,
    about = "Poll a CyteView acquisition service and render analysis frames"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file (defaults to the platform config dir)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit events as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all logging except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and poll the service until interrupted
    Run {
        /// Base URL of the service, overriding the configuration file
        #[arg(long, env = "CYTEVIEW_BASE_URL", value_name = "URL")]
        url: Option<String>,

        /// Username for login, overriding the configuration file
        #[arg(long, env = "CYTEVIEW_USERNAME")]
        username: Option<String>,

        /// Password for login, overriding the configuration file
        #[arg(long, env = "CYTEVIEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Seconds between polling cycles, overriding the configuration file
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },

    /// Log in once to verify credentials, then exit
    Login {
        /// Base URL of the service, overriding the configuration file
        #[arg(long, env = "CYTEVIEW_BASE_URL", value_name = "URL")]
        url: Option<String>,

        /// Username for login, overriding the configuration file
        #[arg(long, env = "CYTEVIEW_USERNAME")]
        username: Option<String>,

        /// Password for login, overriding the configuration file
        #[arg(long, env = "CYTEVIEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Inspect the configuration
    Config {
        /// Print the effective configuration as TOML
        #[arg(long)]
        show: bool,

        /// Print the path of the configuration file in use
        #[arg(long)]
        path: bool,
    },
}
