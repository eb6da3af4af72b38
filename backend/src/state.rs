use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::{
    boost::{BoostPolicy, KeywordBoost},
    config::AppConfig,
    wordpress::{ContentSource, WordPressClient},
};

#[derive(Clone)]
pub struct AppState {
    /// Upstream CMS
    content: Arc<dyn ContentSource>,
    /// Home-listing boost rule
    boost: Arc<dyn BoostPolicy>,
}

impl AppState {
    pub fn new(content: Arc<dyn ContentSource>, boost: Arc<dyn BoostPolicy>) -> Self {
        Self { content, boost }
    }

    pub fn from_config(config: &AppConfig, shutdown: CancellationToken) -> Result<Self> {
        let client = WordPressClient::new(&config.wordpress, shutdown)?;
        Ok(Self::new(Arc::new(client), Arc::new(KeywordBoost::from_config(&config.featured))))
    }

    pub fn content(&self) -> &dyn ContentSource {
        self.content.as_ref()
    }

    pub fn boost(&self) -> &dyn BoostPolicy {
        self.boost.as_ref()
    }
}
