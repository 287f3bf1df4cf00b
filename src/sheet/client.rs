// Google Sheets client for the call log, authenticated with a service account.
use super::error::SheetError;
use super::types::CallLogEntry;
use super::CallLogSink;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::{debug, error, info};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::{OnceCell, RwLock};

pub const SCOPES: &[&str] = &[
    "https://spreadsheets.google.com/feeds",
    "https://www.googleapis.com/auth/drive",
];
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    pub credentials_path: PathBuf,
    pub spreadsheet_title: String,
    pub sheets_api_url: String,
    pub drive_api_url: String,
}

impl GoogleSheetsConfig {
    pub fn new(credentials_path: impl Into<PathBuf>, spreadsheet_title: impl Into<String>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            spreadsheet_title: spreadsheet_title.into(),
            sheets_api_url: DEFAULT_SHEETS_API_URL.to_string(),
            drive_api_url: DEFAULT_DRIVE_API_URL.to_string(),
        }
    }
}

/// The fields of a service-account key file this client needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

pub async fn load_service_account_key(path: &Path) -> Result<ServiceAccountKey, SheetError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SheetError::Auth(format!("could not read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| SheetError::Auth(format!("invalid key file {}: {e}", path.display())))
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) > now
    }
}

/// Process-wide handle to the call-log spreadsheet.
///
/// The key file is read on first use and kept; a failed read is retried on
/// the next call. Access tokens are reused until shortly before they expire.
pub struct GoogleSheetsClient {
    config: GoogleSheetsConfig,
    http: Client,
    key: OnceCell<ServiceAccountKey>,
    token: RwLock<Option<CachedToken>>,
}

impl GoogleSheetsClient {
    pub fn new(config: GoogleSheetsConfig) -> Self {
        Self {
            config,
            http: Client::new(),
            key: OnceCell::new(),
            token: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &GoogleSheetsConfig {
        &self.config
    }

    async fn service_account_key(&self) -> Result<&ServiceAccountKey, SheetError> {
        self.key
            .get_or_try_init(|| load_service_account_key(&self.config.credentials_path))
            .await
    }

    pub async fn access_token(&self) -> Result<String, SheetError> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let mut guard = self.token.write().await;
        if let Some(token) = guard.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let key = self.service_account_key().await?;
        let token = self.request_token(key).await?;
        let access_token = token.access_token.clone();
        *guard = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self, key: &ServiceAccountKey) -> Result<CachedToken, SheetError> {
        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &key.client_email,
            scope: SCOPES.join(" "),
            aud: &key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = key.private_key_id.clone();

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetError::Auth(format!("invalid private key: {e}")))?;
        let assertion = encode(&header, &claims, &signing_key)
            .map_err(|e| SheetError::Auth(format!("could not sign assertion: {e}")))?;

        let response = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SheetError::Auth(format!("token request failed: {e}")))?;
        let response = ensure_success(response)
            .await
            .map_err(|e| SheetError::Auth(format!("token request rejected: {e}")))?;

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: Option<i64>,
        }

        let data: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetError::Auth(format!("invalid token response: {e}")))?;

        debug!("Obtained Google access token for {}", key.client_email);
        Ok(CachedToken {
            access_token: data.access_token,
            expires_at: now + Duration::seconds(data.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS)),
        })
    }

    /// Looks the spreadsheet up by title and returns its id.
    pub async fn open_spreadsheet(&self, access_token: &str) -> Result<String, SheetError> {
        let title = &self.config.spreadsheet_title;
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            title.replace('\\', "\\\\").replace('\'', "\\'"),
            SPREADSHEET_MIME_TYPE
        );

        let response = self
            .http
            .get(format!("{}/files", self.config.drive_api_url))
            .bearer_auth(access_token)
            .query(&[
                ("q", query.as_str()),
                ("pageSize", "1"),
                ("fields", "files(id,name)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await
            .map_err(|e| SheetError::NotFound(e.to_string()))?;
        let response = ensure_success(response).await.map_err(SheetError::NotFound)?;

        #[derive(Deserialize)]
        struct DriveFile {
            id: String,
        }
        #[derive(Deserialize)]
        struct FileList {
            #[serde(default)]
            files: Vec<DriveFile>,
        }

        let list: FileList = response
            .json()
            .await
            .map_err(|e| SheetError::NotFound(e.to_string()))?;

        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| SheetError::NotFound(format!("spreadsheet '{title}' not found")))
    }

    pub async fn first_worksheet_title(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
    ) -> Result<String, SheetError> {
        let response = self
            .http
            .get(format!(
                "{}/spreadsheets/{}",
                self.config.sheets_api_url, spreadsheet_id
            ))
            .bearer_auth(access_token)
            .query(&[("fields", "sheets.properties")])
            .send()
            .await
            .map_err(|e| SheetError::NotFound(e.to_string()))?;
        let response = ensure_success(response).await.map_err(SheetError::NotFound)?;

        #[derive(Deserialize)]
        struct SheetProperties {
            title: String,
            #[serde(default)]
            index: i64,
        }
        #[derive(Deserialize)]
        struct Sheet {
            properties: SheetProperties,
        }
        #[derive(Deserialize)]
        struct SpreadsheetInfo {
            #[serde(default)]
            sheets: Vec<Sheet>,
        }

        let info: SpreadsheetInfo = response
            .json()
            .await
            .map_err(|e| SheetError::NotFound(e.to_string()))?;

        info.sheets
            .into_iter()
            .min_by_key(|s| s.properties.index)
            .map(|s| s.properties.title)
            .ok_or_else(|| SheetError::NotFound("spreadsheet has no worksheets".to_string()))
    }

    pub async fn append_row(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        worksheet_title: &str,
        row: Vec<Value>,
    ) -> Result<(), SheetError> {
        let range = format!("'{}'", worksheet_title.replace('\'', "''"));
        let url = format!(
            "{}/spreadsheets/{}/values/{}:append",
            self.config.sheets_api_url,
            spreadsheet_id,
            urlencoding::encode(&range)
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&serde_json::json!({ "values": [row] }))
            .send()
            .await
            .map_err(|e| SheetError::Write(e.to_string()))?;
        ensure_success(response).await.map_err(SheetError::Write)?;
        Ok(())
    }

    async fn append_entry(&self, entry: &CallLogEntry) -> Result<(), SheetError> {
        let token = self.access_token().await?;
        let spreadsheet_id = self.open_spreadsheet(&token).await?;
        let worksheet = self.first_worksheet_title(&token, &spreadsheet_id).await?;
        self.append_row(&token, &spreadsheet_id, &worksheet, entry.to_row_now())
            .await
    }
}

#[async_trait]
impl CallLogSink for GoogleSheetsClient {
    async fn append_log_row(&self, entry: &CallLogEntry) -> Result<(), SheetError> {
        let result = self.append_entry(entry).await;
        match &result {
            Ok(()) => info!(
                "Appended call log row to '{}'",
                self.config.spreadsheet_title
            ),
            Err(e) => error!("Call log append failed: {e}"),
        }
        result
    }
}

async fn ensure_success(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("{status}: {}", body.trim()))
}
