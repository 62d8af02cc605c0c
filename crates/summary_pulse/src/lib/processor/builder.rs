use crate::{
    config::{PricingTable, SummarizerConfig, TargetWordTable},
    ModelGateway, SummaryProcessor,
};

pub struct SummaryProcessorBuilder<G = ()> {
    gateway: G,
    config: SummarizerConfig,
}

impl SummaryProcessorBuilder {
    pub fn new() -> Self {
        Self {
            gateway: (),
            config: SummarizerConfig::default(),
        }
    }
}

impl Default for SummaryProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> SummaryProcessorBuilder<G> {
    pub fn gateway<G2: ModelGateway + Send + Sync + 'static>(
        self,
        gateway: G2,
    ) -> SummaryProcessorBuilder<G2> {
        SummaryProcessorBuilder {
            gateway,
            config: self.config,
        }
    }

    pub fn config(mut self, config: SummarizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pricing(mut self, pricing: PricingTable) -> Self {
        self.config.pricing = pricing;
        self
    }

    pub fn target_words(mut self, target_words: TargetWordTable) -> Self {
        self.config.target_words = target_words;
        self
    }

    pub fn charge_price(mut self, charge_price: f64) -> Self {
        self.config.charge_price = charge_price;
        self
    }

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }
}

impl<G> SummaryProcessorBuilder<G>
where
    G: ModelGateway + Send + Sync + 'static,
{
    pub fn build(self) -> SummaryProcessor<G> {
        SummaryProcessor {
            gateway: self.gateway,
            config: self.config,
        }
    }
}
