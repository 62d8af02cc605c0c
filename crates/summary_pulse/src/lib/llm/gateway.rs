use std::{fmt::Debug, future::Future};

use crate::{
    error::Error,
    types::{Credential, GatewayReply},
};

/// The single network boundary of the pipeline: one chat completion per call.
///
/// Implementations return the raw reply content; parsing it is up to the caller.
pub trait ModelGateway {
    type Error: Into<Error> + Debug;

    fn invoke(
        &self,
        prompt: &str,
        model: &str,
        credential: &Credential,
    ) -> impl Future<Output = Result<GatewayReply, Self::Error>> + Send;
}

impl<T: ModelGateway + Sync> ModelGateway for &T {
    type Error = T::Error;

    async fn invoke(
        &self,
        prompt: &str,
        model: &str,
        credential: &Credential,
    ) -> Result<GatewayReply, Self::Error> {
        (**self).invoke(prompt, model, credential).await
    }
}
