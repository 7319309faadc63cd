//! Places camera photos into wiki pages next to the edit that was in progress
//! when each photo was taken.
//!
//! Every line of every document is blamed; photo capture times are matched to
//! the nearest commit second and a thumbnail link is spliced in beside the line
//! that commit touched. A small cache remembers which photos were already
//! placed or skipped so repeated runs change nothing.

pub mod blame;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod matcher;
pub mod metadata;
pub mod model;
pub mod pipeline;
pub mod plan;
pub mod rewriter;
pub mod store;
pub mod transfer;

pub use config::RunConfig;
pub use error::{Error, Result};
pub use pipeline::{run, RunReport};
