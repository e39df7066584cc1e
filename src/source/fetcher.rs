use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::error::{Error, Result};
use crate::source::traits::DataSource;

/// Reads the dataset from a local JSON file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl DataSource for FileSource {
    async fn fetch(&self) -> Result<String> {
        info!("Reading dataset from {}", self.path.display());
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Downloads the dataset over HTTP(S).
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("unit-price-trends/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self) -> Result<String> {
        info!("Fetching dataset from {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(Error::HttpStatus(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Picks an HTTP source for http(s) URLs and a file source otherwise.
pub fn source_for(location: &str, timeout: Duration) -> Result<Box<dyn DataSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}
