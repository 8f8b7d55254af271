pub mod submit;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Analysis Proxy - synchronous front door for asynchronous analysis workflows
#[derive(Parser, Debug)]
#[command(
    name = "analysis-proxy",
    version,
    about = "Analysis Proxy - synchronous front door for asynchronous analysis workflows"
)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP proxy in the foreground
    Serve {
        /// Path to configuration file
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short = 'p', long)]
        port: Option<u16>,
    },

    /// Submit one analysis to the workflow backend and wait for the outcome
    Submit(SubmitArgs),
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Path to configuration file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Text to analyze
    #[arg(long, conflicts_with_all = ["url", "file"], required_unless_present_any = ["url", "file"])]
    pub text: Option<String>,

    /// URL to analyze
    #[arg(long, conflicts_with_all = ["text", "file"])]
    pub url: Option<String>,

    /// File to upload for analysis
    #[arg(long, conflicts_with_all = ["text", "url"])]
    pub file: Option<PathBuf>,

    /// Poll interval in milliseconds (overrides config)
    #[arg(long = "interval-ms")]
    pub interval_ms: Option<u64>,

    /// Maximum wait in seconds (overrides config)
    #[arg(long = "max-wait-secs")]
    pub max_wait_secs: Option<u64>,
}

/// Dispatch the CLI command to the appropriate handler.
pub async fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Serve { config, host, port }) => {
            crate::daemon::start_server(config.as_deref(), host.as_deref(), *port).await
        }
        Some(Commands::Submit(args)) => submit::cmd_submit(args).await,
        None => {
            // No subcommand provided -- print help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
