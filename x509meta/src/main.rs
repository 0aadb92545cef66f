//! x509meta: Command-line tool for dumping X.509 certificate metadata as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use x509meta_lib::{transform, CertSource, DialOptions, StderrSink, X509Meta};

#[derive(Parser)]
#[command(
    name = "x509meta",
    version,
    about = "Dump X.509 certificate metadata as JSON",
    long_about = "x509meta reads certificates from a live TLS peer, a PEM bundle or a raw\n\
                  DER file and prints their contents as indented JSON, laid out like\n\
                  `openssl x509 -text`.\n\n\
                  Chains that fail trust verification are still printed; the failure is\n\
                  reported as a warning on stderr.",
    after_help = "EXAMPLES:\n\
                  \n  x509meta show --remote example.com\
                  \n  x509meta show --remote example.com:8443 --chain\
                  \n  x509meta show --pem chain.pem\
                  \n  x509meta show --der cert.der\
                  \n  cat chain.pem | x509meta show --pem -\
                  \n  x509meta fetch example.com > chain.pem"
)]
struct Cli {
    /// Enable debug logging on stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print certificate metadata as JSON
    #[command(after_help = "Exactly one of --remote, --pem or --der must be given.\n\
                      PEM input always prints an array; DER input prints one object;\n\
                      remote input prints the leaf, or the whole chain with --chain.")]
    Show {
        /// TLS peer as host[:port] (port defaults to 443)
        #[arg(long, value_name = "ADDR")]
        remote: Option<String>,
        /// File of PEM CERTIFICATE blocks, or - for stdin
        #[arg(long, value_name = "PATH")]
        pem: Option<String>,
        /// File holding one DER certificate, or - for stdin
        #[arg(long, value_name = "PATH")]
        der: Option<String>,
        /// With --remote, print every certificate the peer sent
        #[arg(long)]
        chain: bool,
        /// Connect and handshake timeout (e.g., 3s, 500ms, or plain seconds)
        #[arg(long, value_name = "DURATION", default_value = "3s", value_parser = parse_duration)]
        timeout: Duration,
    },
    /// Retrieve a peer's certificate chain and print it as PEM
    Fetch {
        /// TLS peer as host[:port] (port defaults to 443)
        addr: String,
        /// Connect and handshake timeout (e.g., 3s, 500ms, or plain seconds)
        #[arg(long, value_name = "DURATION", default_value = "3s", value_parser = parse_duration)]
        timeout: Duration,
    },
}

/// `--timeout` value: bare digits are seconds, anything else goes through
/// humantime (`500ms`, `1m30s`).
fn parse_duration(s: &str) -> Result<Duration> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        let secs: u64 = s.parse().context("Invalid timeout")?;
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).with_context(|| format!("Invalid timeout: '{s}'"))
}

fn dial_options(timeout: Duration) -> DialOptions {
    DialOptions {
        timeout,
        ..DialOptions::default()
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Show {
            remote,
            pem,
            der,
            chain,
            timeout,
        } => {
            let source = CertSource::select(remote, pem, der)?;
            tracing::debug!(?source, chain, ?timeout, "selected input");
            match source {
                CertSource::Remote(addr) => {
                    let certs =
                        x509meta_lib::dial(&addr, &dial_options(timeout), Arc::new(StderrSink))?;
                    if chain {
                        let records: Vec<X509Meta> = certs.iter().map(transform).collect();
                        x509meta_lib::write_many(&mut out, &records)?;
                    } else if let Some(leaf) = certs.first() {
                        x509meta_lib::write_one(&mut out, &transform(leaf))?;
                    }
                }
                CertSource::Pem(path) => {
                    let input = x509meta_lib::open_input(&path)
                        .with_context(|| format!("Failed to open {path}"))?;
                    let certs = x509meta_lib::read_pem(input)
                        .with_context(|| format!("Failed to load certificates from {path}"))?;
                    let records: Vec<X509Meta> = certs.iter().map(transform).collect();
                    x509meta_lib::write_many(&mut out, &records)?;
                }
                CertSource::Der(path) => {
                    let input = x509meta_lib::open_input(&path)
                        .with_context(|| format!("Failed to open {path}"))?;
                    let cert = x509meta_lib::read_der(input)
                        .with_context(|| format!("Failed to load certificate from {path}"))?;
                    x509meta_lib::write_one(&mut out, &transform(&cert))?;
                }
            }
        }
        Commands::Fetch { addr, timeout } => {
            tracing::debug!(%addr, ?timeout, "fetching chain");
            let certs = x509meta_lib::dial(&addr, &dial_options(timeout), Arc::new(StderrSink))?;
            x509meta_lib::write_pem(&mut out, &certs)?;
        }
    }

    Ok(())
}
