//! Test context lifecycle
//!
//! [`TestContext`] scopes one test: `open` installs logging, starts the mock
//! transport and the pipeline, `close` shuts both down and clears all state.

use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::utils::errors::{Result, TestkitError};
use crate::utils::logging::init_logging;
use super::pipeline::DispatchPipeline;
use super::test_client::TestClient;

pub struct TestContext {
    settings: Settings,
    pipeline: Arc<dyn DispatchPipeline>,
    client: Option<TestClient>,
}

impl TestContext {
    pub fn new<P>(settings: Settings, pipeline: P) -> Self
    where
        P: DispatchPipeline + 'static,
    {
        Self {
            settings,
            pipeline: Arc::new(pipeline),
            client: None,
        }
    }

    /// Open the context, returning the client bound to it
    ///
    /// Opening an already open context returns the existing client.
    pub async fn open(&mut self) -> Result<&TestClient> {
        if self.client.is_none() {
            init_logging(&self.settings.logging)?;

            let client = TestClient::create_shared(&self.settings, Arc::clone(&self.pipeline)).await?;
            client.start().await?;
            info!(bot = %self.settings.bot.username, "Test context opened");
            self.client = Some(client);
        }
        self.client()
    }

    pub fn client(&self) -> Result<&TestClient> {
        self.client.as_ref().ok_or(TestkitError::ContextNotOpen)
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shut the pipeline down and drop every piece of recorded state
    pub async fn close(&mut self) -> Result<()> {
        let client = self.client.take().ok_or(TestkitError::ContextNotOpen)?;
        let shutdown = client.close().await;
        client.reset();
        info!(bot = %self.settings.bot.username, "Test context closed");
        shutdown
    }
}
