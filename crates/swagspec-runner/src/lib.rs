//! swagspec-runner: executes contract examples against a live server

pub mod runner;
pub mod transport;

pub use runner::{ContractRunner, RunnerError};
pub use transport::{HttpTransport, Transport, TransportError};
