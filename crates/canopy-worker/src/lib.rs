#![forbid(unsafe_code)]

//! Session store and request router for canopy.
//!
//! The [`Router`] turns raw graphs into cached model graphs and answers expansion and relayout
//! requests against them. [`run_worker`] drives a router from an unbounded `futures` channel;
//! it needs no particular async runtime.

pub mod config;
pub mod error;
pub mod messages;
pub mod router;
pub mod store;
pub mod worker;

pub use config::WorkerConfig;
pub use error::{Error, Result};
pub use messages::{
    ExpansionRequest, ExpansionResponse, ProgressLabel, ProgressUpdate, Rect, RelayoutRequest,
    RelayoutResponse, WorkerRequest, WorkerResponse,
};
pub use router::Router;
pub use store::{SessionKey, SessionStore};
pub use worker::{WorkerHandle, run_worker, spawn_worker};
