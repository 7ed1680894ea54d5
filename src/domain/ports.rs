use crate::domain::model::InsightData;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Key-value slot store. `read_file` yields `None` when the key was never written.
pub trait Storage: Send + Sync {
    fn read_file(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn write_file(
        &self,
        key: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_dir(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn model(&self) -> &str;
    fn api_endpoint(&self) -> &str;

    /// The insight feature is only offered when a credential is present.
    fn insights_enabled(&self) -> bool {
        self.api_key().is_some_and(|k| !k.trim().is_empty())
    }
}

/// A text-generation backend that answers with structured insight JSON.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn generate(&self, prompt: &str, schema: &serde_json::Value) -> Result<InsightData>;
}
