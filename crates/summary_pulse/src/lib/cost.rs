use crate::{config::PricingTable, error::Error, types::ModelUsage};

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

/// Converts provider token usage into USD using the model's pricing entry.
///
/// A model missing from `pricing` is an error, never a zero cost.
pub fn calculate_cost(
    usage: &ModelUsage,
    model: &str,
    pricing: &PricingTable,
) -> Result<CostBreakdown, Error> {
    let entry = pricing.get(model)?;

    let input_cost = (usage.prompt_tokens as f64 / TOKENS_PER_MILLION) * entry.input_per_million;
    let output_cost =
        (usage.completion_tokens as f64 / TOKENS_PER_MILLION) * entry.output_per_million;

    Ok(CostBreakdown {
        input_cost,
        output_cost,
        total_cost: input_cost + output_cost,
    })
}
