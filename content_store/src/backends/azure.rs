//! Azure Blob Storage client construction.

use object_store::{
    azure::{MicrosoftAzure, MicrosoftAzureBuilder},
    ClientOptions,
    RetryConfig,
};
use tracing::debug;

use crate::{ContentError, ContentResult, ContentStoreConfig};

/// Credential picked for the Azure client, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AzureCredential {
    ConnectionString(ConnectionString),
    AccountKey(String),
    SasToken(Vec<(String, String)>),
    ManagedIdentity,
}

/// The subset of an Azure storage connection string the client needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionString {
    pub account_name: Option<String>,
    pub account_key: Option<String>,
    pub blob_endpoint: Option<String>,
    pub shared_access_signature: Option<String>,
    pub protocol: Option<String>,
    pub endpoint_suffix: Option<String>,
    pub use_development_storage: bool,
}

impl ConnectionString {
    /// Parse `Key=Value;Key=Value` pairs. Keys are case-insensitive, unknown
    /// keys are ignored. Values may contain `=` (account keys are base64).
    pub fn parse(value: &str) -> ContentResult<Self> {
        let mut parsed = ConnectionString::default();
        for part in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, val) = part.split_once('=').ok_or_else(|| {
                ContentError::configuration("malformed connection string: expected Key=Value")
            })?;
            let val = val.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "accountname" => parsed.account_name = Some(val),
                "accountkey" => parsed.account_key = Some(val),
                "blobendpoint" => parsed.blob_endpoint = Some(val),
                "sharedaccesssignature" => parsed.shared_access_signature = Some(val),
                "defaultendpointsprotocol" => parsed.protocol = Some(val),
                "endpointsuffix" => parsed.endpoint_suffix = Some(val),
                "usedevelopmentstorage" => {
                    parsed.use_development_storage = val.eq_ignore_ascii_case("true")
                }
                _ => {}
            }
        }
        if !parsed.use_development_storage && parsed.account_name.is_none() {
            return Err(ContentError::configuration(
                "connection string does not name an AccountName",
            ));
        }
        Ok(parsed)
    }

    /// Blob endpoint, explicit or derived from protocol and suffix.
    pub fn endpoint(&self) -> Option<String> {
        if let Some(endpoint) = &self.blob_endpoint {
            return Some(endpoint.clone());
        }
        let suffix = self.endpoint_suffix.as_ref()?;
        let account = self.account_name.as_ref()?;
        let protocol = self.protocol.as_deref().unwrap_or("https");
        Some(format!("{}://{}.blob.{}", protocol, account, suffix))
    }
}

/// Split a SAS token (`sv=...&sig=...`, optionally with a leading `?`) into
/// query pairs.
pub fn parse_sas_token(token: &str) -> ContentResult<Vec<(String, String)>> {
    let token = token.trim().trim_start_matches('?');
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(token.as_bytes())
        .into_owned()
        .collect();
    if !pairs.iter().any(|(key, _)| key == "sig") {
        return Err(ContentError::configuration(
            "SAS token has no signature (sig) parameter",
        ));
    }
    Ok(pairs)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Pick the credential: connection string, then account key, then SAS
/// token, then managed identity.
pub fn select_credential(config: &ContentStoreConfig) -> ContentResult<AzureCredential> {
    if let Some(value) = non_blank(&config.connection_string) {
        return Ok(AzureCredential::ConnectionString(ConnectionString::parse(
            value,
        )?));
    }
    if let Some(key) = non_blank(&config.account_key) {
        return Ok(AzureCredential::AccountKey(key.to_string()));
    }
    if let Some(token) = non_blank(&config.sas_token) {
        return Ok(AzureCredential::SasToken(parse_sas_token(token)?));
    }
    if config.managed_identity {
        return Ok(AzureCredential::ManagedIdentity);
    }
    Err(ContentError::configuration(
        "no Azure credential configured: set connection_string, account_key, sas_token or \
         managed_identity",
    ))
}

/// Build the Azure client. Transport-level retries and the whole-request
/// timeout are disabled; the resilience layer owns both. Only connecting is
/// bounded here.
pub fn build(config: &ContentStoreConfig) -> ContentResult<MicrosoftAzure> {
    let container = non_blank(&config.container_name)
        .ok_or_else(|| ContentError::configuration("Azure Blob container name is required"))?;

    let mut builder = MicrosoftAzureBuilder::new()
        .with_container_name(container)
        .with_retry(RetryConfig {
            max_retries: 0,
            ..Default::default()
        })
        .with_client_options(
            ClientOptions::new()
                .with_connect_timeout(config.timeout())
                .with_timeout_disabled(),
        );

    let mut account = non_blank(&config.account_name).map(str::to_string);
    let mut endpoint = non_blank(&config.endpoint).map(str::to_string);

    let credential = select_credential(config)?;
    let credential_kind = match &credential {
        AzureCredential::ConnectionString(_) => "connection_string",
        AzureCredential::AccountKey(_) => "account_key",
        AzureCredential::SasToken(_) => "sas_token",
        AzureCredential::ManagedIdentity => "managed_identity",
    };
    match credential {
        AzureCredential::ConnectionString(conn) => {
            if conn.use_development_storage {
                builder = builder.with_use_emulator(true);
            }
            if let Some(name) = &conn.account_name {
                account = Some(name.clone());
            }
            if endpoint.is_none() {
                endpoint = conn.endpoint();
            }
            if let Some(key) = conn.account_key {
                builder = builder.with_access_key(key);
            } else if let Some(sas) = conn.shared_access_signature {
                builder = builder.with_sas_authorization(parse_sas_token(&sas)?);
            }
        }
        AzureCredential::AccountKey(key) => builder = builder.with_access_key(key),
        AzureCredential::SasToken(pairs) => builder = builder.with_sas_authorization(pairs),
        // No explicit credential: the client falls back to the instance
        // metadata endpoint.
        AzureCredential::ManagedIdentity => {}
    }

    if let Some(account) = &account {
        builder = builder.with_account(account);
    }
    if let Some(endpoint) = endpoint {
        if endpoint.starts_with("http://") {
            builder = builder.with_allow_http(true);
        }
        builder = builder.with_endpoint(endpoint);
    }

    let client = builder.build().map_err(|e| {
        ContentError::configuration(format!("failed to build Azure Blob client: {}", e))
    })?;

    debug!(
        account = account.as_deref().unwrap_or_default(),
        container,
        credential = credential_kind,
        "created Azure blob client"
    );
    Ok(client)
}
