use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use summary_pulse::{
    types::{Credential, GatewayReply, ModelUsage},
    Error, ModelGateway,
};

#[derive(Debug, Clone)]
pub struct GatewayCall {
    pub prompt: String,
    pub model: String,
}

#[derive(Clone)]
pub struct MockGateway {
    pub content: String,
    pub usage: ModelUsage,
    pub calls: Arc<Mutex<Vec<GatewayCall>>>,
    pub fail_with: Option<String>,
    pub delay: Option<Duration>,
}

impl MockGateway {
    pub fn new(content: &str, prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            content: content.to_string(),
            usage: ModelUsage {
                prompt_tokens,
                completion_tokens,
            },
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            delay: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new("", 0, 0)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl ModelGateway for MockGateway {
    type Error = Error;

    async fn invoke(
        &self,
        prompt: &str,
        model: &str,
        _credential: &Credential,
    ) -> Result<GatewayReply, Self::Error> {
        self.calls.lock().unwrap().push(GatewayCall {
            prompt: prompt.to_string(),
            model: model.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(ref msg) = self.fail_with {
            return Err(Error::Gateway(msg.clone()));
        }

        Ok(GatewayReply {
            content: self.content.clone(),
            usage: self.usage,
        })
    }
}
