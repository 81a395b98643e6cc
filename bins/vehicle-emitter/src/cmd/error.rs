use std::net::SocketAddr;

use vehicle_api::WireError;

/// Startup failures. Any of these ends the process with a non-zero status.
#[derive(Debug, thiserror::Error)]
pub enum EmitterError {
    #[error("config: {0}")]
    Config(String),

    #[error("resolve {target}: {source}")]
    Resolve { target: String, source: std::io::Error },

    #[error("resolve {0}: no address")]
    NoAddress(String),

    #[error("bind udp socket on {local}: {source}")]
    SocketAcquisition { local: SocketAddr, source: std::io::Error },
}

/// Failure of a single emission. Contained in its iteration; the loop goes on.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("{0}")]
    Encoding(#[from] WireError),

    #[error("send: {0}")]
    Transmission(#[from] std::io::Error),
}
