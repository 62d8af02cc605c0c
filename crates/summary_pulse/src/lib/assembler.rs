use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    config::PricingTable,
    cost::calculate_cost,
    error::Error,
    types::{GatewayReply, SummaryRequest, SummaryResult},
    words::count_words,
};

/// The structured part of a model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSummary {
    pub summary: String,
    pub key_points: Vec<String>,
    pub main_topics: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
    summary: Option<String>,
    key_points: Option<Vec<String>>,
    main_topics: Option<Vec<String>>,
}

impl ParsedSummary {
    /// Parses reply content. `summary` is mandatory; absent or null list fields become empty.
    pub fn from_content(content: &str) -> Result<Self, Error> {
        let raw: RawSummary = serde_json::from_str(content)
            .map_err(|e| Error::MalformedReply(format!("Reply is not a JSON summary object: {e}")))?;

        let summary = raw
            .summary
            .ok_or_else(|| Error::MalformedReply("Reply has no 'summary' field".into()))?;

        Ok(Self {
            summary,
            key_points: raw.key_points.unwrap_or_default(),
            main_topics: raw.main_topics.unwrap_or_default(),
        })
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Formats `original / summary` as `"N.N:1"`.
pub fn compression_ratio(original_words: usize, summary_words: usize) -> Result<String, Error> {
    if summary_words == 0 {
        return Err(Error::DivisionByZero);
    }
    let ratio = round_to(original_words as f64 / summary_words as f64, 1);
    Ok(format!("{ratio:.1}:1"))
}

/// Combines a request and a gateway reply into the final [`SummaryResult`].
#[derive(Debug, Clone, Copy)]
pub struct SummaryAssembler<'a> {
    pricing: &'a PricingTable,
    charge_price: f64,
}

impl<'a> SummaryAssembler<'a> {
    pub fn new(pricing: &'a PricingTable, charge_price: f64) -> Self {
        Self {
            pricing,
            charge_price,
        }
    }

    #[tracing::instrument(skip_all, fields(model = %request.model))]
    pub fn assemble(
        &self,
        request: &SummaryRequest,
        reply: &GatewayReply,
        summarized_at: DateTime<Utc>,
    ) -> Result<SummaryResult, Error> {
        let parsed = ParsedSummary::from_content(&reply.content)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to parse model reply"))?;

        let original_word_count = count_words(&request.text);
        let summary_word_count = count_words(&parsed.summary);
        let compression_ratio = compression_ratio(original_word_count, summary_word_count)?;

        let cost = calculate_cost(&reply.usage, &request.model, self.pricing)?;
        // profit is taken from the unrounded cost and may go negative
        let profit = round_to(self.charge_price - cost.total_cost, 4);

        tracing::debug!(
            prompt_tokens = reply.usage.prompt_tokens,
            completion_tokens = reply.usage.completion_tokens,
            cost = cost.total_cost,
            profit,
            "Computed invocation cost"
        );

        Ok(SummaryResult {
            original_text: request.text.clone(),
            original_word_count,
            summary: parsed.summary,
            key_points: parsed.key_points,
            main_topics: parsed.main_topics,
            summary_word_count,
            compression_ratio,
            format: request.format,
            length: request.length,
            model: request.model.clone(),
            cost: round_to(cost.total_cost, 6),
            charge_price: self.charge_price,
            profit,
            summarized_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::PricingEntry, types::ModelUsage};

    fn pricing() -> PricingTable {
        PricingTable::empty()
            .with_entry("free-tier-model", PricingEntry::FREE)
            .with_entry("pricey-model", PricingEntry::new(400_000.0, 1_000_000.0))
            .with_entry("paid-model", PricingEntry::new(3.0, 15.0))
    }

    fn reply(content: &str, prompt_tokens: u64, completion_tokens: u64) -> GatewayReply {
        GatewayReply {
            content: content.to_string(),
            usage: ModelUsage {
                prompt_tokens,
                completion_tokens,
            },
        }
    }

    #[test]
    fn test_parse_full_reply() {
        let parsed = ParsedSummary::from_content(
            r#"{"summary": "s", "keyPoints": ["a", "b"], "mainTopics": ["t"]}"#,
        )
        .unwrap();
        assert_eq!(parsed.key_points, vec!["a", "b"]);
        assert_eq!(parsed.main_topics, vec!["t"]);
    }

    #[test]
    fn test_parse_defaults_missing_and_null_lists() {
        let parsed =
            ParsedSummary::from_content(r#"{"summary": "s", "keyPoints": null}"#).unwrap();
        assert!(parsed.key_points.is_empty());
        assert!(parsed.main_topics.is_empty());
    }

    #[test]
    fn test_parse_requires_summary() {
        let result = ParsedSummary::from_content(r#"{"keyPoints": ["a"]}"#);
        assert!(matches!(result, Err(Error::MalformedReply(_))));

        let result = ParsedSummary::from_content(r#"{"summary": null}"#);
        assert!(matches!(result, Err(Error::MalformedReply(_))));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let result = ParsedSummary::from_content("Here is your summary: blah");
        assert!(matches!(result, Err(Error::MalformedReply(_))));
    }

    #[test]
    fn test_compression_ratio_formatting() {
        assert_eq!(compression_ratio(1000, 200).unwrap(), "5.0:1");
        assert_eq!(compression_ratio(500, 75).unwrap(), "6.7:1");
        assert_eq!(compression_ratio(10, 40).unwrap(), "0.3:1");
    }

    #[test]
    fn test_compression_ratio_zero_summary_words() {
        assert!(matches!(
            compression_ratio(100, 0),
            Err(Error::DivisionByZero)
        ));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.0135004, 6), 0.0135);
        assert_eq!(round_to(0.49999, 4), 0.5);
        assert_eq!(round_to(-1.23456, 4), -1.2346);
    }

    #[test]
    fn test_empty_summary_is_division_by_zero() {
        let request = SummaryRequest::new("some words here", "free-tier-model", "key");
        let pricing = pricing();
        let result = SummaryAssembler::new(&pricing, 0.5).assemble(
            &request,
            &reply(r#"{"summary": "<p></p>"}"#, 10, 0),
            Utc::now(),
        );
        assert!(matches!(result, Err(Error::DivisionByZero)));
    }

    #[test]
    fn test_cost_and_profit_rounding() {
        let request = SummaryRequest::new("one two three four", "paid-model", "key");
        let pricing = pricing();
        let result = SummaryAssembler::new(&pricing, 0.5)
            .assemble(&request, &reply(r#"{"summary": "one two"}"#, 1234, 567), Utc::now())
            .unwrap();

        // 0.003702 + 0.008505
        assert_eq!(result.cost, 0.012207);
        assert_eq!(result.profit, 0.4878);
        assert_eq!(result.compression_ratio, "2.0:1");
    }

    #[test]
    fn test_negative_profit_is_not_clamped() {
        let request = SummaryRequest::new("one two three four", "pricey-model", "key");
        let pricing = pricing();
        let result = SummaryAssembler::new(&pricing, 0.5)
            .assemble(&request, &reply(r#"{"summary": "one"}"#, 10, 0), Utc::now())
            .unwrap();

        assert_eq!(result.cost, 4.0);
        assert_eq!(result.profit, -3.5);
    }

    #[test]
    fn test_unknown_model_fails_pricing_lookup() {
        let request = SummaryRequest::new("one two", "not/priced", "key");
        let pricing = pricing();
        let result = SummaryAssembler::new(&pricing, 0.5).assemble(
            &request,
            &reply(r#"{"summary": "one"}"#, 10, 10),
            Utc::now(),
        );
        assert!(matches!(result, Err(Error::PricingLookup { .. })));
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let request = SummaryRequest::new("alpha beta gamma delta epsilon", "paid-model", "key");
        let pricing = pricing();
        let assembler = SummaryAssembler::new(&pricing, 0.5);
        let reply = reply(
            r#"{"summary": "alpha beta", "keyPoints": ["k"], "mainTopics": ["m"]}"#,
            999,
            333,
        );
        let at = Utc::now();

        let first = assembler.assemble(&request, &reply, at).unwrap();
        let second = assembler.assemble(&request, &reply, at).unwrap();
        assert_eq!(first, second);
    }
}
