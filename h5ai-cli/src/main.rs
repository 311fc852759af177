use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use h5ai::{ClientConfig, Item};

mod tree;

use tree::{TreeWalker, WalkOptions, format_item};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// User-Agent header to send. Empty to send none.
    #[arg(long, env = "H5AI_USER_AGENT", global = true)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Increase log verbosity (-v logs HTTP exchanges, -vv traces filtering).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the raw listing of a directory, as the server sent it.
    List {
        /// Directory URL
        url: String,
    },
    /// Print the entries below a directory.
    Items {
        /// Directory URL
        url: String,
    },
    /// Download one file.
    Get {
        /// File URL
        url: String,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Recursively list a directory tree.
    Walk {
        /// Root directory URL
        url: String,
        /// Do not descend below this many levels under the root.
        #[arg(long)]
        max_depth: Option<usize>,
        /// Only print directories.
        #[arg(long)]
        dirs_only: bool,
        /// Abort on the first directory that cannot be listed.
        #[arg(long)]
        fail_fast: bool,
    },
}

impl Cli {
    fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent.as_str());
        }
        if let Some(secs) = self.timeout {
            config = config.request_timeout(Duration::from_secs(secs));
        }
        if self.verbose > 0 {
            config = config.log_hook(|line| tracing::info!(target: "h5ai_cli::http", "{line}"));
        }
        config
    }
}

/// Filter used when `RUST_LOG` is unset.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "h5ai=info,h5ai_cli=info",
        1 => "h5ai=debug,h5ai_cli=debug",
        _ => "h5ai=trace,h5ai_cli=trace",
    }
}

fn init_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_items(items: &[Item]) {
    for item in items {
        println!("{}", format_item(item));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = cli.config();

    match cli.command {
        Command::List { url } => {
            let items = h5ai::list(&url, config)
                .await
                .with_context(|| format!("listing {url}"))?;
            print_items(&items);
        }
        Command::Items { url } => {
            let items = h5ai::items(&url, config)
                .await
                .with_context(|| format!("listing {url}"))?;
            print_items(&items);
        }
        Command::Get { url, output } => {
            let body = h5ai::get(&url, config)
                .await
                .with_context(|| format!("downloading {url}"))?;
            match output {
                Some(path) => tokio::fs::write(&path, &body)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?,
                None => std::io::stdout().lock().write_all(&body)?,
            }
            tracing::info!(bytes = body.len(), "downloaded {url}");
        }
        Command::Walk {
            url,
            max_depth,
            dirs_only,
            fail_fast,
        } => {
            let mut walker = TreeWalker::new(WalkOptions {
                max_depth,
                dirs_only,
                fail_fast,
            });
            h5ai::walk(
                &url,
                |href, item, err| {
                    let (control, line) = walker.visit(href, item, err)?;
                    if let Some(line) = line {
                        println!("{line}");
                    }
                    Ok(control)
                },
                config,
            )
            .await
            .with_context(|| format!("walking {url}"))?;

            let summary = walker.summary();
            tracing::info!(
                items = summary.items,
                directories = summary.directories,
                files = summary.files,
                size = summary.size,
                failed = summary.failed,
                "walk finished"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_walk_options() {
        let cli = Cli::try_parse_from([
            "h5ai",
            "-v",
            "walk",
            "https://h.example/demo/",
            "--max-depth",
            "2",
            "--fail-fast",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(
            cli.command,
            Command::Walk {
                max_depth: Some(2),
                fail_fast: true,
                dirs_only: false,
                ..
            }
        ));
    }

    #[test]
    fn quiet_filter_logs_info() {
        assert_eq!(default_filter(0), "h5ai=info,h5ai_cli=info");
        assert_eq!(default_filter(2), default_filter(5));
    }
}
