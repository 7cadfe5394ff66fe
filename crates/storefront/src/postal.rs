//! CEP lookup through a ViaCEP-compatible service.
//!
//! `GET {base}/ws/{cep}/json/` answers with the street, neighborhood, city
//! and state for a CEP, or `{ "erro": true }` when the CEP does not exist.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use vitrine_core::{Cep, CepError, CheckoutAddress};

use crate::config::StorefrontConfig;

/// Errors from a CEP lookup.
#[derive(Debug, Error)]
pub enum PostalError {
    #[error("CEP inválido: {0}")]
    InvalidCep(#[from] CepError),

    #[error("CEP não encontrado")]
    NotFound,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup service returned status {0}")]
    Status(u16),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Address fields returned by the lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostalAddress {
    pub cep: Cep,
    pub street: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl PostalAddress {
    /// Fill `address` from this result. `number` is never touched and
    /// `complement` only when the shopper left it empty.
    pub fn apply_to(&self, address: &mut CheckoutAddress) {
        address.cep = self.cep.to_string();
        address.street.clone_from(&self.street);
        address.neighborhood.clone_from(&self.neighborhood);
        address.city.clone_from(&self.city);
        address.state.clone_from(&self.state);

        let has_complement = address
            .complement
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        if !has_complement && self.complement.is_some() {
            address.complement.clone_from(&self.complement);
        }
    }
}

/// Raw lookup response.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    /// `true` (or `"true"` in newer deployments) for unknown CEPs.
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    complemento: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

impl LookupResponse {
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    fn into_address(self, cep: Cep) -> PostalAddress {
        let complement = Some(self.complemento).filter(|c| !c.trim().is_empty());
        PostalAddress {
            cep,
            street: self.logradouro,
            complement,
            neighborhood: self.bairro,
            city: self.localidade,
            state: self.uf,
        }
    }
}

/// Client for the CEP lookup service.
#[derive(Debug, Clone)]
pub struct PostalClient {
    client: reqwest::Client,
    base_url: Url,
}

impl PostalClient {
    /// Create a client for the configured lookup service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, PostalError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self::with_client(client, config.postal_base_url.clone()))
    }

    #[must_use]
    pub const fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Look up a CEP as typed by the shopper.
    ///
    /// # Errors
    ///
    /// Returns `PostalError::InvalidCep` before any request when the input
    /// is not an eight-digit CEP.
    pub async fn lookup_str(&self, raw: &str) -> Result<PostalAddress, PostalError> {
        let cep = Cep::parse(raw)?;
        self.lookup(&cep).await
    }

    /// Look up a CEP.
    ///
    /// # Errors
    ///
    /// Returns `PostalError::NotFound` for unknown CEPs, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(cep = %cep))]
    pub async fn lookup(&self, cep: &Cep) -> Result<PostalAddress, PostalError> {
        let url = self
            .base_url
            .join(&format!("ws/{}/json/", cep.digits()))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            return Err(PostalError::NotFound);
        }
        if !status.is_success() {
            return Err(PostalError::Status(status.as_u16()));
        }

        let body: LookupResponse = response.json().await?;
        if body.is_not_found() {
            debug!("CEP not found");
            return Err(PostalError::NotFound);
        }

        Ok(body.into_address(cep.clone()))
    }
}
