use crate::{
    Config, FetchOutcome, WeatherError, WeatherQuery, provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use tokio::task::JoinHandle;
use tracing::warn;

pub mod openweather;

/// A source of current-weather observations.
///
/// Implementations never return errors out of band: every problem is a
/// [`FetchOutcome::Failure`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, query: &WeatherQuery) -> FetchOutcome;
}

/// Construct the shared provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::from_config(config)?;
    Ok(Arc::new(provider))
}

/// A fetch running in the background.
#[derive(Debug)]
pub struct FetchHandle {
    query: WeatherQuery,
    task: JoinHandle<FetchOutcome>,
}

impl FetchHandle {
    pub fn query(&self) -> &WeatherQuery {
        &self.query
    }

    /// Wait for the fetch to finish. A task that died without an outcome
    /// is reported as a failure too.
    pub async fn outcome(self) -> FetchOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(city = %self.query.city(), error = %err, "fetch task ended without outcome");
                FetchOutcome::Failure(WeatherError::TaskFailed(err.to_string()))
            }
        }
    }
}

/// Run `provider.fetch(query)` on the tokio runtime, off the caller's task.
///
/// Must be called from within a tokio runtime.
pub fn spawn_fetch(provider: Arc<dyn WeatherProvider>, query: WeatherQuery) -> FetchHandle {
    let task_query = query.clone();
    let task = tokio::spawn(async move { provider.fetch(&task_query).await });
    FetchHandle { query, task }
}
