//! # Summarizer configuration
//!
//! Every tunable of the pipeline lives here: target word counts, the model
//! pricing table, the per-invocation charge price and the generation settings
//! sent to the provider. All of it is built once at startup and only read
//! afterwards.

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::Error, types::SummaryLength};

pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_CHARGE_PRICE: f64 = 0.50;
pub const DEFAULT_TEMPERATURE: f64 = 0.5;
pub const DEFAULT_MAX_TOKENS: u32 = 1500;
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an expert at analyzing and summarizing content concisely and accurately.";

/// Approximate summary length, in words, for each [`SummaryLength`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWordTable {
    pub short: u32,
    pub medium: u32,
    pub long: u32,
}

impl Default for TargetWordTable {
    fn default() -> Self {
        Self {
            short: 75,
            medium: 175,
            long: 350,
        }
    }
}

impl TargetWordTable {
    pub fn target_for(&self, length: SummaryLength) -> u32 {
        match length {
            SummaryLength::Short => self.short,
            SummaryLength::Medium => self.medium,
            SummaryLength::Long => self.long,
        }
    }
}

/// Price in USD per one million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    #[serde(rename = "input")]
    pub input_per_million: f64,
    #[serde(rename = "output")]
    pub output_per_million: f64,
}

impl PricingEntry {
    pub const FREE: PricingEntry = PricingEntry::new(0.0, 0.0);

    pub const fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    fn validate(&self, model: &str) -> Result<(), Error> {
        let valid = |price: f64| price.is_finite() && price >= 0.0;
        if !valid(self.input_per_million) || !valid(self.output_per_million) {
            return Err(Error::Config(format!(
                "Prices for '{model}' must be finite and non-negative"
            )));
        }
        Ok(())
    }
}

/// Model identifier to [`PricingEntry`]. Lookups of unknown models fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingTable(HashMap<String, PricingEntry>);

impl Default for PricingTable {
    fn default() -> Self {
        Self::empty()
            .with_entry("anthropic/claude-3.5-sonnet", PricingEntry::new(3.00, 15.00))
            .with_entry("openai/gpt-4o", PricingEntry::new(2.50, 10.00))
            .with_entry("google/gemini-2.0-flash-exp:free", PricingEntry::FREE)
    }
}

impl PricingTable {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn with_entry(mut self, model: impl Into<String>, entry: PricingEntry) -> Self {
        self.0.insert(model.into(), entry);
        self
    }

    pub fn get(&self, model: &str) -> Result<&PricingEntry, Error> {
        self.0.get(model).ok_or_else(|| Error::PricingLookup {
            model: model.to_string(),
        })
    }

    pub fn contains(&self, model: &str) -> bool {
        self.0.contains_key(model)
    }

    /// Parses a `{ "<model>": { "input": f64, "output": f64 } }` document.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let table: PricingTable = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid pricing table: {e}")))?;

        if table.0.is_empty() {
            return Err(Error::Config("Pricing table has no entries".into()));
        }
        for (model, entry) in &table.0 {
            entry.validate(model)?;
        }

        Ok(table)
    }

    #[tracing::instrument]
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        let table = Self::from_json_str(&json)?;
        tracing::info!(models = table.0.len(), "Loaded pricing table override");
        Ok(table)
    }
}

/// Parameters of the chat completion call that are not per-request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub system_prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarizerConfig {
    pub target_words: TargetWordTable,
    pub pricing: PricingTable,
    pub charge_price: f64,
    pub default_model: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            target_words: TargetWordTable::default(),
            pricing: PricingTable::default(),
            charge_price: DEFAULT_CHARGE_PRICE,
            default_model: DEFAULT_MODEL.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_words() {
        let table = TargetWordTable::default();
        assert_eq!(table.target_for(SummaryLength::Short), 75);
        assert_eq!(table.target_for(SummaryLength::Medium), 175);
        assert_eq!(table.target_for(SummaryLength::Long), 350);
    }

    #[test]
    fn test_default_pricing_contains_default_model() {
        let table = PricingTable::default();
        assert!(table.contains(DEFAULT_MODEL));
        assert_eq!(
            table.get("google/gemini-2.0-flash-exp:free").unwrap(),
            &PricingEntry::FREE
        );
    }

    #[test]
    fn test_unknown_model_lookup_fails() {
        let table = PricingTable::default();
        let err = table.get("mystery/model").unwrap_err();
        assert!(matches!(err, Error::PricingLookup { ref model } if model == "mystery/model"));
    }

    #[test]
    fn test_pricing_from_json() {
        let json = r#"{
            "free-tier-model": { "input": 0, "output": 0 },
            "meta/llama": { "input": 0.2, "output": 0.6 }
        }"#;
        let table = PricingTable::from_json_str(json).expect("valid pricing json");

        assert_eq!(table.get("meta/llama").unwrap().output_per_million, 0.6);
        assert!(!table.contains(DEFAULT_MODEL));
    }

    #[test]
    fn test_pricing_rejects_negative_prices() {
        let json = r#"{ "m": { "input": -1.0, "output": 0 } }"#;
        assert!(matches!(
            PricingTable::from_json_str(json),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_pricing_rejects_empty_table() {
        assert!(matches!(
            PricingTable::from_json_str("{}"),
            Err(Error::Config(_))
        ));
    }
}
