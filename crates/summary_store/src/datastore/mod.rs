use std::future::Future;

use serde::Serialize;

pub mod fs;

pub trait DataStore {
    fn push_record<T: Serialize + Sync>(
        &self,
        record: &T,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn list_records(&self) -> impl Future<Output = anyhow::Result<Vec<serde_json::Value>>> + Send;
}

impl<D: DataStore + Send + Sync> DataStore for &D {
    async fn push_record<T: Serialize + Sync>(&self, record: &T) -> anyhow::Result<()> {
        (**self).push_record(record).await
    }

    async fn list_records(&self) -> anyhow::Result<Vec<serde_json::Value>> {
        (**self).list_records().await
    }
}
