use tokio_util::sync::CancellationToken;

use super::config::Effective;
use super::emitter::{EmitStats, Emitter};
use super::error::EmitterError;
use super::source::{DataSource, FileSource, RandomSource};
use super::transport::UdpTransport;

// ═══════════════════════════════════════════════════════════════
//  Main dispatch
// ═══════════════════════════════════════════════════════════════

pub async fn run(args: &Effective) -> Result<(), EmitterError> {
    let transport = UdpTransport::open(&args.host, args.port).await?;

    println!("Vehicle Emitter (schema v{})", vehicle_api::SCHEMA_VERSION);
    println!("  target   : {}", transport.target());
    println!("  interval : {:.3}s", args.interval.as_secs_f64());
    if let Some(n) = args.count {
        println!("  count    : {n}");
    }

    let token = CancellationToken::new();
    spawn_ctrl_c(token.clone());

    let stats = if let Some(ref path) = args.file {
        let source = FileSource::open(path)?;
        println!("  mode     : file ({}, {} records)", source.path, source.total());
        println!();
        emit(source, transport, args, token).await
    } else {
        println!("  mode     : random");
        println!();
        emit(RandomSource::new(args.seed), transport, args, token).await
    };

    tracing::info!(
        attempted = stats.attempted,
        sent = stats.sent,
        skipped = stats.skipped,
        failed = stats.failed,
        "emitter stopped"
    );
    Ok(())
}

async fn emit<S: DataSource>(
    source: S,
    transport: UdpTransport,
    args: &Effective,
    token: CancellationToken,
) -> EmitStats {
    tracing::info!(dest = %transport.target(), "emitting (Ctrl+C to stop)");
    let start = std::time::Instant::now();

    let stats = Emitter::new(source, transport, args.interval)
        .with_limit(args.count)
        .run(token)
        .await;

    let elapsed = start.elapsed();
    tracing::info!(
        sent = stats.sent,
        elapsed_s = format_args!("{:.1}", elapsed.as_secs_f64()),
        "emission finished"
    );
    stats
}

fn spawn_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Ctrl+C received, stopping");
                token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "cannot listen for Ctrl+C"),
        }
    });
}
