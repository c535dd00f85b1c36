//! adsb-feeder: Edge binary that reads Mode S receiver feeds.
//!
//! Supports:
//! - Replaying recorded Beast/AVR captures from a file or stdin
//! - Connecting to a live receiver feed over TCP
//!
//! The wire format is detected from the bytes themselves; frames are printed
//! one per line on stdout, logs go to stderr.

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adsb_core::config::{self, Config, OutputFormat};
use adsb_core::{AdsbError, ExtractorStats, FrameExtractor};

mod capture;
mod output;

use output::FrameWriter;

#[derive(Parser)]
#[command(
    name = "adsb-feeder",
    version,
    about = "Mode S receiver feed framing (Beast / AVR)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: hex or json (default from config)
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    /// Bytes per read (default from config)
    #[arg(long, global = true, env = "ADSB_CHUNK_SIZE")]
    chunk_size: Option<usize>,

    /// Remove parity from frames that still carry it
    #[arg(long, global = true)]
    strip_parity: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract frames from a recorded capture
    Extract {
        /// Capture file with raw receiver output, `-` for stdin
        file: PathBuf,
    },

    /// Connect to a receiver feed over TCP and extract frames
    Connect {
        /// Receiver host
        #[arg(long, env = "ADSB_HOST")]
        host: Option<String>,

        /// Receiver port (30005 Beast, 30002 AVR on most decoders)
        #[arg(long, env = "ADSB_PORT")]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = config::load_config();
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(chunk_size) = cli.chunk_size.filter(|&n| n > 0) {
        config.source.chunk_size = chunk_size;
    }

    let result = match cli.command {
        Commands::Extract { file } => cmd_extract(&file, &config, cli.strip_parity),
        Commands::Connect { host, port } => {
            if let Some(host) = host {
                config.source.host = host;
            }
            if let Some(port) = port {
                config.source.port = port;
            }
            cmd_connect(&config, cli.strip_parity)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn cmd_extract(file: &Path, config: &Config, strip_parity: bool) -> adsb_core::Result<()> {
    let stdout = io::stdout();
    let mut writer = FrameWriter::new(stdout.lock(), config.output.format, strip_parity);
    let mut extractor = FrameExtractor::new();

    let total = if file.to_str() == Some("-") {
        capture::replay(io::stdin().lock(), &mut extractor, config.source.chunk_size, |f| {
            writer.write(f)
        })?
    } else {
        let reader = std::fs::File::open(file).map_err(|e| {
            io::Error::new(e.kind(), format!("opening {}: {e}", file.display()))
        })?;
        capture::replay(reader, &mut extractor, config.source.chunk_size, |f| writer.write(f))?
    };
    writer.flush()?;

    info!(source = %file.display(), bytes = total, "capture done");
    log_summary(&extractor, writer.written());
    Ok(())
}

fn cmd_connect(config: &Config, strip_parity: bool) -> adsb_core::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let addr = format!("{}:{}", config.source.host, config.source.port);
        let stream = tokio::net::TcpStream::connect(&addr).await?;
        info!(%addr, receiver = %config.receiver.name, "connected");

        let stdout = io::stdout();
        let mut writer = FrameWriter::new(stdout.lock(), config.output.format, strip_parity);
        let mut extractor = FrameExtractor::new();

        let feed = capture::pump(stream, &mut extractor, config.source.chunk_size, |f| {
            writer.write(f)
        });

        tokio::select! {
            result = feed => {
                result?;
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted");
            }
        }

        writer.flush()?;
        log_summary(&extractor, writer.written());
        Ok::<_, AdsbError>(())
    })
}

fn log_summary(extractor: &FrameExtractor, frames_written: u64) {
    let ExtractorStats {
        bytes_received,
        frames_emitted,
        frames_dropped,
        bytes_discarded,
        resyncs,
    } = extractor.stats();
    let format = extractor
        .detected_mode()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "undetected".into());

    info!(
        %format,
        bytes_received,
        frames_emitted,
        frames_written,
        frames_dropped,
        bytes_discarded,
        resyncs,
        "extraction summary"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_extract_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-capture.bin");
        let err = cmd_extract(&missing, &Config::default(), false).unwrap_err();
        match err {
            AdsbError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_empty_capture() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.flush().unwrap();
        assert!(cmd_extract(file.path(), &Config::default(), false).is_ok());
    }
}
