//! The `ipfsx` command-line interface.
//!
//! Drives the workspace crates from the terminal: upload with live
//! progress, download, local CID calculation, node version, and the dev
//! CORS proxy.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use ipfsx_api::{ApiConfig, DEFAULT_API_ADDR, DEFAULT_PROXY_PORT};
use ipfsx_client::IpfsClient;
use ipfsx_proxy::{ProxyConfig, ProxyServer};
use ipfsx_transfer::{progress_channel, spawn_ramp};
use ipfsx_upload::{NoticeKind, SelectedFile, UploadWidget};

#[derive(Parser)]
#[command(
    name = "ipfsx",
    version,
    about = "A tool for IPFS operations including CID calculation, uploading and downloading"
)]
struct Cli {
    /// Node RPC address (host:port).
    #[arg(long, global = true, default_value = DEFAULT_API_ADDR)]
    api: String,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, default_value_t = 60)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a file to the IPFS network.
    Upload {
        /// Path to the file.
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Download a file from the IPFS network.
    Download {
        /// IPFS CID of the file.
        #[arg(short, long)]
        cid: String,
        /// Output file path.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Calculate CID v1 for a file without contacting the node.
    Cid {
        /// Path to the file.
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print the node's version.
    Version,
    /// Run the dev CORS proxy in front of the node's API.
    Proxy {
        /// Port to listen on.
        #[arg(long, default_value_t = DEFAULT_PROXY_PORT)]
        port: u16,
        /// Upstream origin; defaults to the node RPC address.
        #[arg(long)]
        upstream: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = ApiConfig {
        addr: cli.api.clone(),
        timeout: Duration::from_secs(cli.timeout),
    };

    match cli.command {
        Command::Upload { file } => upload(config, file).await,
        Command::Download { cid, output } => download(config, &cid, output).await,
        Command::Cid { file } => {
            let cid = ipfsx_cid::cid_for_file(&file)?;
            println!("CID v1: {cid}");
            Ok(())
        }
        Command::Version => {
            let client = IpfsClient::new(config)?;
            let version = client
                .version()
                .await
                .context("failed to connect to IPFS daemon")?;
            println!("ipfs daemon version {}", version.version);
            Ok(())
        }
        Command::Proxy { port, upstream } => proxy(&cli.api, port, upstream).await,
    }
}

/// Uploads one file, rendering the widget's progress to stderr.
async fn upload(config: ApiConfig, path: PathBuf) -> Result<()> {
    let meta = tokio::fs::metadata(&path)
        .await
        .with_context(|| format!("file does not exist: {}", path.display()))?;
    if meta.is_dir() {
        bail!("path is a directory, only single files can be uploaded");
    }

    let client = IpfsClient::new(config)?;
    client
        .version()
        .await
        .context("failed to connect to IPFS daemon")?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());

    let mut widget = UploadWidget::new();
    widget.select_file(SelectedFile::new(name, meta.len(), &path));
    let Some(selected) = widget.begin_upload() else {
        bail!("no file selected");
    };

    let (sender, mut events) = progress_channel(Uuid::new_v4());
    let ramp = spawn_ramp(sender.clone());
    let transfer = {
        let client = client.clone();
        let sender = sender.clone();
        tokio::spawn(async move { client.add_file(&selected.path, &sender).await })
    };
    // The channel closes once the transfer task and the ramp drop their
    // sender halves; only they produce from here on.
    drop(sender);

    while let Some(event) = events.recv().await {
        widget.apply(event);
        if widget.is_uploading() {
            eprint!("\rUploading: {:>3}%", widget.progress());
        }
    }
    eprintln!("\rUploading: {:>3}%", widget.progress());
    let _ = ramp.await;
    let _ = transfer.await;

    render_notices(&widget);
    match widget.receipt() {
        Some(receipt) => {
            println!("File uploaded. CID: {}", receipt.cid);
            println!("File size: {} bytes", receipt.size);
            if let Some(url) = widget.gateway_url() {
                println!("Gateway: {url}");
            }
            Ok(())
        }
        None => {
            let message = widget.failure().unwrap_or("upload failed").to_string();
            bail!(message);
        }
    }
}

/// Terminal rendition of the widget's transient notices.
fn render_notices(widget: &UploadWidget) {
    for notice in widget.notices().iter() {
        let tag = match notice.kind {
            NoticeKind::Loading => "..",
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
            NoticeKind::Info => "info",
        };
        eprintln!("[{tag}] {}", notice.text);
    }
}

async fn download(config: ApiConfig, cid: &str, output: PathBuf) -> Result<()> {
    let client = IpfsClient::new(config)?;
    let written = client
        .download(cid, &output)
        .await
        .context("failed to download file from IPFS")?;
    println!("File downloaded to: {} ({written} bytes)", output.display());
    Ok(())
}

async fn proxy(api: &str, port: u16, upstream: Option<String>) -> Result<()> {
    let upstream = upstream.unwrap_or_else(|| format!("http://{api}"));
    tracing::info!(%upstream, port, "starting dev proxy");
    let server = ProxyServer::new(ProxyConfig { port, upstream });

    let shutdown = Arc::clone(&server);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.shutdown();
        }
    });

    println!("IPFS proxy server running on http://localhost:{port}");
    server.run().await?;
    Ok(())
}
