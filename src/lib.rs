pub mod activation;
pub mod cli;
pub mod dom;
pub mod error;
pub mod exclusion;
pub mod field;
pub mod messaging;
pub mod page;
pub mod pipeline;
pub mod policy;
pub mod scoring;
pub mod semantic;
pub mod settings;
pub mod trace;

pub use crate::pipeline::{Pipeline, PipelineConfig};
