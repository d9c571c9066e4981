use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::error::{ReconcilerError, Result};
use crate::schema::{parse_users, UserRecord};
use log::{debug, info};
use reqwest::Client;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads sheet tabs as CSV. One attempt per call; retrying is up to the caller.
#[derive(Clone)]
pub struct SheetClient {
    client: Client,
    config: DashboardConfig,
}

impl SheetClient {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub async fn fetch_csv(&self, sheet: &str) -> Result<String> {
        let url = self.config.sheet_csv_url(sheet);
        debug!("Fetching sheet '{}' from {}", sheet, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReconcilerError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    pub async fn fetch_forecast_csv(&self) -> Result<String> {
        self.fetch_csv(&self.config.forecast_sheet).await
    }

    pub async fn fetch_delivery_csv(&self) -> Result<String> {
        self.fetch_csv(&self.config.delivery_sheet).await
    }

    pub async fn fetch_users(&self) -> Result<Vec<UserRecord>> {
        let text = self.fetch_csv(&self.config.users_sheet).await?;
        parse_users(&text, &self.config.users_sheet)
    }
}

impl Dashboard {
    /// Fetches both tabs concurrently and reloads from them.
    pub async fn reload(&mut self, client: &SheetClient) -> Result<()> {
        self.reload_from(client.fetch_forecast_csv(), client.fetch_delivery_csv())
            .await?;
        info!("Reloaded {} records from '{}'", self.records().len(), client.config().spreadsheet_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_valid_config() {
        assert!(matches!(
            SheetClient::new(DashboardConfig::default()),
            Err(ReconcilerError::Config(_))
        ));
        assert!(SheetClient::new(DashboardConfig::new("abc")).is_ok());
    }

    #[tokio::test]
    async fn test_reload_keeps_state_when_fetch_fails() {
        let mut dash = Dashboard::new(DashboardConfig::new("abc"));
        let err = dash
            .reload_from(
                async {
                    Err::<String, _>(ReconcilerError::HttpStatus {
                        url: "https://example.invalid/Previsao".to_string(),
                        status: 503,
                    })
                },
                async { Ok::<_, ReconcilerError>(String::new()) },
            )
            .await
            .unwrap_err();
        assert!(err.is_reload_failure());
        assert!(dash.records().is_empty());
    }
}
