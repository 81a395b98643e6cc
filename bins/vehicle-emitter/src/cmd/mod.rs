pub mod config;
pub mod emitter;
pub mod error;
pub mod run;
pub mod source;
pub mod transport;
