//! Presentation-side state: the last successful report and the actions a
//! user can take on it.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::bail;
use pkweather_core::{
    FetchOutcome, Report, ReportFormatter, WeatherError, WeatherProvider, WeatherQuery,
    spawn_fetch,
};
use tracing::info;

#[derive(Debug)]
pub struct Session {
    provider: Arc<dyn WeatherProvider>,
    formatter: ReportFormatter,
    last_report: Option<Report>,
}

impl Session {
    pub fn new(provider: Arc<dyn WeatherProvider>, formatter: ReportFormatter) -> Self {
        Self {
            provider,
            formatter,
            last_report: None,
        }
    }

    /// Fetch and render the weather for `city`.
    ///
    /// Empty input is rejected before anything is dispatched. On failure the
    /// previous report is kept.
    pub async fn check(&mut self, city: &str) -> Result<&Report, WeatherError> {
        let query = WeatherQuery::new(city)?;
        let handle = spawn_fetch(Arc::clone(&self.provider), query);

        let observation = match handle.outcome().await {
            FetchOutcome::Success(obs) => obs,
            FetchOutcome::Failure(err) => return Err(err),
        };

        let report = self.formatter.render(&observation)?;
        Ok(&*self.last_report.insert(report))
    }

    pub fn last_report(&self) -> Option<&Report> {
        self.last_report.as_ref()
    }

    /// Save the last report, adding a `.txt` extension when `path` has none.
    /// Returns the path actually written.
    pub fn save(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let Some(report) = &self.last_report else {
            bail!("No report to save. Please fetch weather first.");
        };

        let path = with_default_extension(path);
        report.save(&path)?;
        info!(path = %path.display(), "report saved");
        Ok(path)
    }

    pub fn clear(&mut self) {
        self.last_report = None;
    }
}

fn with_default_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("txt")
    }
}
