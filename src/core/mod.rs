pub mod etl;
pub mod extract;
pub mod pipeline;
pub mod runner;
pub mod template;

pub use crate::domain::model::{ExtractedModule, ExtractionReport, LoadSummary, ToolOutput};
pub use crate::domain::ports::{CommandRunner, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
