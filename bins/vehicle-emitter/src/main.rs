mod cmd;

use clap::Parser;
use cmd::config::{EmitArgs, Effective};

#[derive(Parser)]
#[command(name = "vehicle-emitter", about = "Periodic vehicle telemetry emitter over UDP")]
struct Cli {
    #[command(flatten)]
    args: EmitArgs,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let eff = match Effective::new(&cli.args) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cmd::run::run(&eff).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
