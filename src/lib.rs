// Library root
// -----------
// The binary (`main.rs`) parses flags, builds a `Config` and hands it to
// `workflow::run`. Everything it does is reachable from here so it can be
// driven from tests with a scripted transport.
//
// Module responsibilities:
// - `api`: the `Transport` trait and its reqwest blocking implementation.
// - `uploader`, `poller`, `patcher`: the three workflow steps.
// - `workflow`: chains the steps strictly forward.
// - `config`, `model`, `error`: shared types.
// - `ui`: token prompt and storage, spinner, summary output.
pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod patcher;
pub mod poller;
pub mod ui;
pub mod uploader;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiResponse, HttpTransport, Transport, UploadForm};
pub use config::Config;
pub use error::{Error, Result};
pub use poller::{PollOutcome, Poller, Sleeper, ThreadSleeper};
pub use workflow::{run, WorkflowReport};
