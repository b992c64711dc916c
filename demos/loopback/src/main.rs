//! Transfers a file between two simulated devices in one process.
//!
//! Usage:
//!
//! ```text
//! loopback-demo <file> [output-dir]
//! ```
//!
//! Both "devices" live in memory, connected by the loopback link: what one
//! displays, the other's camera samples. Run with `RUST_LOG=debug` to
//! watch the lockstep frame-by-frame.

use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use qrferry::{
    loopback_pair, DirectorySink, DocumentDescriptor, EndpointConfig,
    LoopbackConfig, ReceiveOutcome, ReceiverEndpoint, SenderEndpoint,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        eprintln!("usage: loopback-demo <file> [output-dir]");
        std::process::exit(2);
    };
    let output_dir =
        args.next().map(PathBuf::from).unwrap_or_else(std::env::temp_dir);

    let metadata = std::fs::metadata(&input)?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file.bin".to_string());
    let doc = DocumentDescriptor::new(
        name,
        "application/octet-stream",
        metadata.len(),
    );
    tracing::info!(
        file = %input.display(),
        bytes = metadata.len(),
        transfer_id = %doc.transfer_id,
        "starting loopback transfer"
    );

    // Generous intervals keep the log readable; a real deployment ties the
    // refresh to the QR renderer and the scan interval to the camera.
    let link = LoopbackConfig {
        scan_interval: Duration::from_millis(20),
        drop_rate: 0.1,
    };
    let endpoints = EndpointConfig {
        refresh: Duration::from_millis(20),
        done_linger: Duration::from_millis(500),
    };

    let (device_a, device_b) = loopback_pair(link);
    let (a_display, a_scanner) = device_a.split();
    let (b_display, b_scanner) = device_b.split();

    let source = BufReader::new(std::fs::File::open(&input)?);
    let (sender, _send_handle) = SenderEndpoint::start(
        doc,
        source,
        a_display,
        a_scanner,
        endpoints.clone(),
    )?;
    let (receiver, _recv_handle) =
        ReceiverEndpoint::new(b_display, b_scanner, endpoints);
    let receiver = receiver.with_sink(DirectorySink::new(&output_dir));

    let (_, outcome) = tokio::try_join!(sender.run(), receiver.run())?;

    match outcome {
        ReceiveOutcome::Completed(file) => {
            tracing::info!(
                name = %file.name,
                bytes = file.bytes.len(),
                dir = %output_dir.display(),
                "transfer complete"
            );
        }
        ReceiveOutcome::Cancelled => {
            tracing::warn!("transfer cancelled");
        }
    }
    Ok(())
}
