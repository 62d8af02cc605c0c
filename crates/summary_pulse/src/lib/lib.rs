mod assembler;
pub mod config;
mod cost;
mod error;
mod llm;
mod processor;
pub mod tracing;
pub mod types;
mod words;

pub use assembler::{compression_ratio, round_to, ParsedSummary, SummaryAssembler};
pub use cost::{calculate_cost, CostBreakdown};
pub use error::Error;
pub use llm::openrouter;
pub use llm::{gateway::ModelGateway, prompt::build_summary_prompt};
pub use processor::{builder::SummaryProcessorBuilder, SummaryProcessor};
pub use words::count_words;
