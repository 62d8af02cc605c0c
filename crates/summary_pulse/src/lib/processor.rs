pub mod builder;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::{
    assembler::SummaryAssembler,
    config::SummarizerConfig,
    error::Error,
    llm::prompt::build_summary_prompt,
    types::{InputRecord, SummaryRequest, SummaryResult},
    words::count_words,
    ModelGateway,
};

// The core single-document summarization pipeline
#[derive(Debug)]
pub struct SummaryProcessor<G>
where
    G: ModelGateway + Send + Sync + 'static,
{
    pub(crate) gateway: G,
    pub(crate) config: SummarizerConfig,
}

impl<G> SummaryProcessor<G>
where
    G: ModelGateway + Send + Sync + 'static,
{
    pub fn new(gateway: G, config: SummarizerConfig) -> Self {
        SummaryProcessor { gateway, config }
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Turns a raw host record into a request this processor can price.
    /// Nothing is sent anywhere.
    pub fn prepare(&self, input: InputRecord) -> Result<SummaryRequest, Error> {
        SummaryRequest::from_input(input, &self.config.default_model)
            .and_then(|request| {
                self.config.pricing.get(&request.model)?;
                Ok(request)
            })
            .inspect_err(|e| tracing::error!(error = %e, "Rejected input record"))
    }

    /// Validates a raw host record and runs the pipeline on it
    pub async fn process(&self, input: InputRecord) -> Result<SummaryResult, Error> {
        let request = self.prepare(input)?;
        self.run(&request).await
    }

    pub async fn run(&self, request: &SummaryRequest) -> Result<SummaryResult, Error> {
        self.run_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Runs the pipeline, abandoning the model call as soon as `cancel` fires
    #[tracing::instrument(
        skip_all,
        fields(model = %request.model, length = %request.length, format = %request.format)
    )]
    pub async fn run_with_cancellation(
        &self,
        request: &SummaryRequest,
        cancel: CancellationToken,
    ) -> Result<SummaryResult, Error> {
        request.validate()?;

        // no network call for a model we cannot price
        self.config.pricing.get(&request.model)?;

        let original_words = count_words(&request.text);
        let target_words = self.config.target_words.target_for(request.length);
        tracing::info!(
            original_words,
            target_words,
            "Summarizing {original_words} words to ~{target_words} words..."
        );

        let prompt = build_summary_prompt(
            &request.text,
            target_words,
            request.format,
            request.include_key_points,
        );

        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!("Model call cancelled before completion");
                return Err(Error::Cancelled);
            }
            reply = self.gateway.invoke(&prompt, &request.model, &request.credential) => {
                reply
                    .map_err(Into::<Error>::into)
                    .inspect_err(|e| {
                        tracing::error!(error = %e, transient = e.is_transient(), "Model call failed")
                    })?
            }
        };

        let result = SummaryAssembler::new(&self.config.pricing, self.config.charge_price)
            .assemble(request, &reply, Utc::now())?;

        tracing::info!(
            summary_words = result.summary_word_count,
            compression_ratio = %result.compression_ratio,
            cost = result.cost,
            profit = result.profit,
            "Summary created: {} words ({} compression)",
            result.summary_word_count,
            result.compression_ratio
        );

        Ok(result)
    }
}
