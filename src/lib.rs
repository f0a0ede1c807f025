use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::Settings;
use crate::outline::parse;
use crate::publish::publish;
use crate::remote::GraphClient;

pub mod clipboard;
pub mod config;
pub mod domain;
pub mod outline;
pub mod publish;
pub mod remote;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a nested bullet list into a JSON node tree
    Parse {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,

        /// Print the JSON instead of copying it to the clipboard
        #[arg(long)]
        no_copy: bool,
    },

    /// Parse a nested bullet list and upload it to the content graph
    Upload {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,

        /// Service URL override for this invocation
        #[arg(long)]
        url: Option<String>,

        /// API key override for this invocation
        #[arg(long, env = "OUTLINE2GRAPH_API_KEY")]
        api_key: Option<String>,
    },

    /// Show or update the stored service settings
    Config {
        /// Service base URL to store
        #[arg(long)]
        url: Option<String>,

        /// API key to store
        #[arg(long)]
        api_key: Option<String>,
    },
}

pub async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Parse { file, no_copy } => run_parse(file.as_deref(), no_copy),
        Command::Upload { file, url, api_key } => run_upload(file.as_deref(), url, api_key).await,
        Command::Config { url, api_key } => run_config(url, api_key),
    }
}

pub fn run_parse(file: Option<&Path>, no_copy: bool) -> Result<()> {
    let text = read_input(file)?;
    let nodes = parse(&text);
    let json = serde_json::to_string_pretty(&nodes).context("Failed to serialize node tree")?;

    if no_copy {
        println!("{json}");
        return Ok(());
    }

    match clipboard::copy(&json) {
        Ok(()) => println!("Node tree JSON copied to clipboard."),
        Err(e) => {
            debug!("clipboard unavailable: {e:#}");
            println!("{json}");
        }
    }
    Ok(())
}

pub async fn run_upload(
    file: Option<&Path>,
    url: Option<String>,
    api_key: Option<String>,
) -> Result<()> {
    let mut settings = Settings::load()?;
    if let Some(url) = url {
        settings.graph_url = url;
    }
    if let Some(api_key) = api_key {
        settings.api_key = api_key;
    }

    // Both checks run before any remote traffic.
    let api_key = settings.require_api_key()?;
    let graph_url = settings.require_graph_url()?;

    let text = read_input(file)?;
    let nodes = parse(&text);
    if nodes.is_empty() {
        println!("No bullet lines found; nothing to upload.");
        return Ok(());
    }

    println!("Uploading {} nodes to {graph_url}...", nodes.len());
    let client = GraphClient::new(graph_url, api_key);
    let report = publish(&nodes, &client).await?;
    println!("Uploaded {} nodes.", report.published);
    Ok(())
}

pub fn run_config(url: Option<String>, api_key: Option<String>) -> Result<()> {
    let mut settings = Settings::load()?;

    if url.is_none() && api_key.is_none() {
        println!("graph_url = {}", settings.graph_url);
        println!(
            "api_key   = {}",
            if settings.api_key.is_empty() {
                "(not set)"
            } else {
                "(set)"
            }
        );
        return Ok(());
    }

    if let Some(url) = url {
        settings.graph_url = url;
    }
    if let Some(api_key) = api_key {
        settings.api_key = api_key;
    }
    settings.save()?;
    println!("Settings saved.");
    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}
