use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::{OnceCell, RwLock};

use crate::config::{SheetHeaders, SheetsConfig};
use crate::error::{AppError, Result};
use crate::sheets::types::WorkItem;
use crate::sheets::Spreadsheet;

use super::auth::{generate_grant_jwt, ServiceAccountKey, SHEETS_SCOPE};
use super::mapper;

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

pub struct GoogleSheets {
    client: Client,
    key: ServiceAccountKey,
    spreadsheet_id: String,
    worksheet: OnceCell<String>,
    headers: SheetHeaders,
    header_rows: u32,
    /// Cached access token and its expiry
    token_cache: RwLock<Option<(String, chrono::DateTime<chrono::Utc>)>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

impl GoogleSheets {
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        let key = ServiceAccountKey::from_file(&config.service_account_key_path)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let worksheet = match &config.worksheet {
            Some(title) => OnceCell::new_with(Some(title.clone())),
            None => OnceCell::new(),
        };

        Ok(Self {
            client,
            key,
            spreadsheet_id: config.spreadsheet_id.clone(),
            worksheet,
            headers: config.headers.clone(),
            header_rows: config.header_rows,
            token_cache: RwLock::new(None),
        })
    }

    async fn access_token(&self) -> Result<String> {
        // Check cache
        {
            let cache = self.token_cache.read().await;
            if let Some((token, expiry)) = cache.as_ref() {
                if *expiry > chrono::Utc::now() + chrono::Duration::minutes(5) {
                    return Ok(token.clone());
                }
            }
        }

        let assertion = generate_grant_jwt(&self.key, SHEETS_SCOPE)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SheetsAuth(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        let expires_at = chrono::Utc::now() + chrono::Duration::seconds(token.expires_in);

        let mut cache = self.token_cache.write().await;
        *cache = Some((token.access_token.clone(), expires_at));

        Ok(token.access_token)
    }

    /// Title of the worksheet in use; defaults to the first sheet.
    async fn worksheet_title(&self) -> Result<&str> {
        let title = self
            .worksheet
            .get_or_try_init(|| async {
                let token = self.access_token().await?;
                let url = format!("{SHEETS_API_URL}/{}", self.spreadsheet_id);
                let meta: SpreadsheetMeta = self
                    .send_checked(
                        self.client
                            .get(&url)
                            .query(&[("fields", "sheets.properties.title")])
                            .bearer_auth(token),
                    )
                    .await?
                    .json()
                    .await?;

                meta.sheets
                    .into_iter()
                    .next()
                    .map(|s| s.properties.title)
                    .ok_or_else(|| AppError::Sheets("Spreadsheet has no worksheets".to_string()))
            })
            .await?;

        Ok(title.as_str())
    }

    async fn send_checked(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Sheets(format!("API returned {status}: {body}")));
        }
        Ok(response)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{SHEETS_API_URL}/{}/values/{}",
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }
}

#[async_trait]
impl Spreadsheet for GoogleSheets {
    async fn fetch_work_items(&self) -> Result<Vec<WorkItem>> {
        let title = self.worksheet_title().await?;
        let token = self.access_token().await?;

        let range: ValueRange = self
            .send_checked(
                self.client
                    .get(self.values_url(&mapper::quoted_sheet(title)))
                    .bearer_auth(token),
            )
            .await?
            .json()
            .await?;

        Ok(mapper::map_work_items(&range.values, &self.headers, self.header_rows))
    }

    async fn update_cell(&self, row: u32, column: u32, value: &str) -> Result<()> {
        let title = self.worksheet_title().await?;
        let token = self.access_token().await?;
        let range = mapper::a1_cell(title, row, column);

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [[value]],
        });

        self.send_checked(
            self.client
                .put(self.values_url(&range))
                .query(&[("valueInputOption", "RAW")])
                .bearer_auth(token)
                .json(&body),
        )
        .await?;

        Ok(())
    }
}
