use std::{fmt, str::FromStr};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }
}

impl FromStr for SummaryLength {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(SummaryLength::Short),
            "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            other => Err(Error::Validation(format!(
                "Unknown length '{other}', expected one of: short, medium, long"
            ))),
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    #[default]
    Paragraph,
    Bullets,
    Abstract,
}

impl SummaryFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryFormat::Paragraph => "paragraph",
            SummaryFormat::Bullets => "bullets",
            SummaryFormat::Abstract => "abstract",
        }
    }
}

impl FromStr for SummaryFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paragraph" => Ok(SummaryFormat::Paragraph),
            "bullets" => Ok(SummaryFormat::Bullets),
            "abstract" => Ok(SummaryFormat::Abstract),
            other => Err(Error::Validation(format!(
                "Unknown format '{other}', expected one of: paragraph, bullets, abstract"
            ))),
        }
    }
}

impl fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider API token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// The raw record handed over by the host, before defaults and validation.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    pub text: Option<String>,
    pub length: Option<String>,
    pub format: Option<String>,
    pub include_key_points: Option<bool>,
    pub model: Option<String>,
    #[serde(alias = "credential")]
    pub openrouter_api_key: Option<String>,
}

/// A validated summarization request.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub text: String,
    pub length: SummaryLength,
    pub format: SummaryFormat,
    pub include_key_points: bool,
    pub model: String,
    pub credential: Credential,
}

impl SummaryRequest {
    pub fn new(
        text: impl Into<String>,
        model: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            length: SummaryLength::default(),
            format: SummaryFormat::default(),
            include_key_points: true,
            model: model.into(),
            credential: Credential::new(credential),
        }
    }

    pub fn with_length(mut self, length: SummaryLength) -> Self {
        self.length = length;
        self
    }

    pub fn with_format(mut self, format: SummaryFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_key_points(mut self, include_key_points: bool) -> Self {
        self.include_key_points = include_key_points;
        self
    }

    /// Applies defaults to a host record and validates it.
    pub fn from_input(input: InputRecord, default_model: &str) -> Result<Self, Error> {
        let text = input
            .text
            .ok_or_else(|| Error::Validation("Text is required".into()))?;
        let credential = input
            .openrouter_api_key
            .map(Credential::new)
            .ok_or_else(|| Error::Validation("OpenRouter API key is required".into()))?;

        let length = input
            .length
            .as_deref()
            .map(str::parse::<SummaryLength>)
            .transpose()?
            .unwrap_or_default();
        let format = input
            .format
            .as_deref()
            .map(str::parse::<SummaryFormat>)
            .transpose()?
            .unwrap_or_default();

        let request = Self {
            text,
            length,
            format,
            include_key_points: input.include_key_points.unwrap_or(true),
            model: input.model.unwrap_or_else(|| default_model.to_string()),
            credential,
        };
        request.validate()?;

        Ok(request)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.text.trim().is_empty() {
            return Err(Error::Validation("Text is required".into()));
        }
        if self.credential.is_empty() {
            return Err(Error::Validation("OpenRouter API key is required".into()));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Validation("Model identifier must not be empty".into()));
        }
        Ok(())
    }
}

/// Token counters reported by the provider. Trusted as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ModelUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Raw model output plus usage for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    pub content: String,
    pub usage: ModelUsage,
}

/// The final output record, one per successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub original_text: String,
    pub original_word_count: usize,
    pub summary: String,
    pub key_points: Vec<String>,
    pub main_topics: Vec<String>,
    pub summary_word_count: usize,
    pub compression_ratio: String,
    pub format: SummaryFormat,
    pub length: SummaryLength,
    pub model: String,
    pub cost: f64,
    pub charge_price: f64,
    pub profit: f64,
    #[serde(serialize_with = "serialize_millis")]
    pub summarized_at: DateTime<Utc>,
}

fn serialize_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
