//! Attested ledger client
//!
//! Backend for a cryptographically attested external ledger service
//! (Azure Confidential Ledger style REST API). This is the only variant
//! where tamper resistance is provided by a party other than this system.
//!
//! Inserts return `processing` immediately - the service's consensus
//! process has not completed when the HTTP call returns. `retrieve` polls
//! the entry until the service reports readiness, bounded by the
//! configured attempt count.
//!
//! Authentication uses the Azure AD client-credentials flow over plain
//! `reqwest`; the acquired token is cached until shortly before expiry.

use crate::config::AttestedLedgerConfig;
use crate::domain::errors::LedgerError;
use crate::domain::ids::TransactionId;
use crate::domain::result::Result;
use crate::ledger::contract::{
    stamp_payload, unstamp_payload, DeliveryStatus, LedgerBackend, LedgerEntry, Receipt,
};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const API_VERSION: &str = "2024-08-22-preview";
const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
const DEFAULT_SCOPE: &str = "https://confidential-ledger.azure.com/.default";
const TRANSACTION_ID_HEADER: &str = "x-ms-ccf-transaction-id";

/// Refresh the cached token this long before it actually expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    state: String,
    entry: Option<EntryBody>,
}

#[derive(Debug, Deserialize)]
struct EntryBody {
    contents: String,
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// REST client for the attested ledger service
#[derive(Debug)]
pub struct AttestedLedger {
    config: AttestedLedgerConfig,
    http_client: reqwest::Client,
    token_cache: Mutex<Option<CachedToken>>,
}

impl AttestedLedger {
    /// Builds the client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the service certificate cannot be
    /// read or the HTTP client cannot be constructed.
    pub fn new(config: AttestedLedgerConfig) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.request_timeout_seconds));

        // The service presents a ledger-identity TLS certificate that is
        // not publicly rooted; pin it when one is configured
        if let Some(cert_path) = &config.certificate_path {
            let pem = std::fs::read(cert_path).map_err(|e| {
                LedgerError::AuthenticationFailed(format!(
                    "Failed to read ledger certificate {cert_path}: {e}"
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                LedgerError::AuthenticationFailed(format!(
                    "Invalid ledger certificate {cert_path}: {e}"
                ))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let http_client = builder
            .build()
            .map_err(|e| LedgerError::ConnectionFailed(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            config,
            http_client,
            token_cache: Mutex::new(None),
        })
    }

    fn token_endpoint(&self) -> String {
        let authority = self
            .config
            .authority_host
            .as_deref()
            .unwrap_or(DEFAULT_AUTHORITY_HOST)
            .trim_end_matches('/')
            .to_string();
        format!(
            "{authority}/{}/oauth2/v2.0/token",
            self.config.tenant_id
        )
    }

    fn transaction_url(&self, transaction_id: Option<&str>) -> String {
        let endpoint = self.config.endpoint.trim_end_matches('/');
        match transaction_id {
            Some(id) => {
                format!("{endpoint}/app/transactions/{id}?api-version={API_VERSION}")
            }
            None => format!("{endpoint}/app/transactions?api-version={API_VERSION}"),
        }
    }

    /// Returns a valid bearer token, refreshing via client credentials
    /// when the cached one is absent or close to expiry
    async fn bearer_token(&self) -> Result<String> {
        let mut cache = self.token_cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(cached.token.clone());
            }
        }

        let scope = self
            .config
            .scope
            .as_deref()
            .unwrap_or(DEFAULT_SCOPE)
            .to_string();

        tracing::debug!(
            tenant_id = %self.config.tenant_id,
            client_id = %self.config.client_id,
            "Acquiring ledger access token"
        );

        let response = self
            .http_client
            .post(self.token_endpoint())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret().as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LedgerError::ConnectionFailed(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::AuthenticationFailed(format!(
                "Token endpoint returned {status}: {body}"
            ))
            .into());
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(format!("Bad token response: {e}")))?;

        let bearer = token.access_token.clone();
        *cache = Some(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(bearer)
    }

    fn map_error_status(status: u16, body: String) -> LedgerError {
        match status {
            401 | 403 => LedgerError::AuthenticationFailed(format!("{status}: {body}")),
            400..=499 => LedgerError::ClientError {
                status,
                message: body,
            },
            _ => LedgerError::ServerError {
                status,
                message: body,
            },
        }
    }

    /// Fetches the entry once, without polling
    async fn fetch_entry(&self, transaction_id: &TransactionId) -> Result<Option<LedgerEntry>> {
        let token = self.bearer_token().await?;
        let response = self
            .http_client
            .get(self.transaction_url(Some(transaction_id.as_str())))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| LedgerError::ConnectionFailed(format!("Retrieve failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, body).into());
        }

        let parsed: TransactionResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(format!("Bad entry response: {e}")))?;

        if !parsed.state.eq_ignore_ascii_case("ready") {
            return Ok(Some(LedgerEntry {
                transaction_id: transaction_id.clone(),
                status: DeliveryStatus::Processing,
                payload: None,
                content_hash: None,
            }));
        }

        let entry = parsed.entry.ok_or_else(|| {
            LedgerError::InvalidResponse("Ready entry without a body".to_string())
        })?;
        let stored: Value = serde_json::from_str(&entry.contents)
            .map_err(|e| LedgerError::InvalidResponse(format!("Bad entry contents: {e}")))?;
        let (payload, hash) = unstamp_payload(&stored).ok_or_else(|| {
            LedgerError::InvalidResponse(format!(
                "Entry {transaction_id} has no stamped body"
            ))
        })?;

        Ok(Some(LedgerEntry {
            transaction_id: transaction_id.clone(),
            status: DeliveryStatus::Ready,
            payload: Some(payload),
            content_hash: Some(hash),
        }))
    }
}

#[async_trait]
impl LedgerBackend for AttestedLedger {
    async fn insert(&self, payload: &Value) -> Result<Receipt> {
        let token = self.bearer_token().await?;
        let (stamped, hash) = stamp_payload(payload);

        // The service stores contents as an opaque string
        let contents = serde_json::to_string(&stamped)
            .map_err(|e| LedgerError::InsertFailed(format!("Payload encoding failed: {e}")))?;

        let response = self
            .http_client
            .post(self.transaction_url(None))
            .bearer_auth(&token)
            .json(&json!({ "contents": contents }))
            .send()
            .await
            .map_err(|e| LedgerError::ConnectionFailed(format!("Insert failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, body).into());
        }

        let transaction_id = response
            .headers()
            .get(TRANSACTION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                LedgerError::InvalidResponse(format!(
                    "Insert response missing {TRANSACTION_ID_HEADER} header"
                ))
            })?;

        tracing::debug!(
            transaction_id = %transaction_id,
            content_hash = %hash,
            "Appended entry to attested ledger"
        );

        // Finality has not been reached yet; the caller sees processing
        Ok(Receipt {
            transaction_id: TransactionId::new(transaction_id)
                .map_err(LedgerError::InvalidResponse)?,
            status: DeliveryStatus::Processing,
        })
    }

    async fn retrieve(&self, transaction_id: &TransactionId) -> Result<Option<LedgerEntry>> {
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        for attempt in 0..self.config.max_poll_attempts {
            match self.fetch_entry(transaction_id).await? {
                None => return Ok(None),
                Some(entry) if entry.is_finalized() => return Ok(Some(entry)),
                Some(pending) => {
                    tracing::trace!(
                        transaction_id = %transaction_id,
                        attempt,
                        "Entry not yet finalized"
                    );
                    if attempt + 1 == self.config.max_poll_attempts {
                        // Bound reached: surface the unfinalized entry so the
                        // caller can distinguish it from an unknown id
                        return Ok(Some(pending));
                    }
                    tokio::time::sleep(interval).await;
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn config(endpoint: &str) -> AttestedLedgerConfig {
        AttestedLedgerConfig {
            endpoint: endpoint.to_string(),
            tenant_id: "tenant".to_string(),
            client_id: "client".to_string(),
            client_secret: Secret::new("secret".to_string().into()),
            certificate_path: None,
            authority_host: None,
            scope: None,
            poll_interval_ms: 10,
            max_poll_attempts: 3,
            request_timeout_seconds: 5,
        }
    }

    #[test]
    fn test_token_endpoint_uses_tenant() {
        let ledger = AttestedLedger::new(config("https://ledger.example.com")).unwrap();
        assert_eq!(
            ledger.token_endpoint(),
            "https://login.microsoftonline.com/tenant/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_transaction_urls() {
        let ledger = AttestedLedger::new(config("https://ledger.example.com/")).unwrap();
        assert_eq!(
            ledger.transaction_url(None),
            format!("https://ledger.example.com/app/transactions?api-version={API_VERSION}")
        );
        assert_eq!(
            ledger.transaction_url(Some("2.13")),
            format!("https://ledger.example.com/app/transactions/2.13?api-version={API_VERSION}")
        );
    }

    #[test]
    fn test_error_status_mapping() {
        assert!(matches!(
            AttestedLedger::map_error_status(401, String::new()),
            LedgerError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            AttestedLedger::map_error_status(422, String::new()),
            LedgerError::ClientError { status: 422, .. }
        ));
        assert!(matches!(
            AttestedLedger::map_error_status(503, String::new()),
            LedgerError::ServerError { status: 503, .. }
        ));
    }
}
