use crate::error::Result;

/// Where the raw dataset JSON comes from.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;

    /// Human-readable location for log messages.
    fn describe(&self) -> String;
}
