//! Consul backend over the HTTP KV API (`/v1/kv/`).

use base64::Engine;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Certificate, Identity, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::{directory_prefix, immediate_children, Backend, ConnectionParams, KvPair};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::tls::TlsMaterial;
use crate::infrastructure::traits::KvStore;

const BACKEND: Backend = Backend::Consul;

/// One entry of a `?recurse` listing.
#[derive(Debug, Deserialize)]
struct ConsulEntry {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Value")]
    value: Option<String>,
}

/// Store handle talking to a single Consul agent.
#[derive(Debug)]
pub struct ConsulStore {
    client: Client,
    kv_url: Url,
}

impl ConsulStore {
    /// Build the HTTP client. Consul is contacted lazily on the first request.
    pub fn connect(params: &ConnectionParams, tls: Option<&TlsMaterial>) -> InfraResult<Self> {
        let mut builder = Client::builder()
            .connect_timeout(params.timeout)
            .timeout(params.timeout);

        let scheme = match tls {
            Some(tls) => {
                let ca = Certificate::from_pem(&tls.ca_pem)
                    .map_err(|e| InfraError::connect(BACKEND, e))?;
                let identity = Identity::from_pem(&tls.identity_pem())
                    .map_err(|e| InfraError::connect(BACKEND, e))?;
                builder = builder
                    .use_rustls_tls()
                    .tls_built_in_root_certs(false)
                    .add_root_certificate(ca)
                    .identity(identity);
                "https"
            }
            None => "http",
        };

        let client = builder
            .build()
            .map_err(|e| InfraError::connect(BACKEND, e))?;
        let kv_url = kv_url(scheme, params.primary_address())?;
        debug!("consul kv endpoint: {}", kv_url);
        Ok(Self { client, kv_url })
    }

    /// URL of `key` below `/v1/kv/`.
    ///
    /// Each key segment is percent-encoded, so `?`, `#` and `%` in a key stay
    /// part of the key instead of starting a query or fragment.
    fn url(&self, key: &str, query: Option<&str>) -> InfraResult<Url> {
        let mut url = self.kv_url.clone();
        url.path_segments_mut()
            .map_err(|_| InfraError::backend(BACKEND, format!("{} has no path", self.kv_url)))?
            .pop_if_empty()
            .extend(normalize(key).split('/'));
        url.set_query(query);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> InfraResult<Response> {
        request.send().map_err(|e| InfraError::backend(BACKEND, e))
    }
}

/// Map a 404 to `KeyNotFound` and any other non-success status to a backend error.
fn check(resp: Response, key: &str) -> InfraResult<Response> {
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Err(InfraError::KeyNotFound(key.to_string()));
    }
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(InfraError::backend(
            BACKEND,
            format!("{}: {}", status, body.trim()),
        ));
    }
    Ok(resp)
}

/// Consul keys never start with a slash.
fn normalize(key: &str) -> &str {
    key.trim_start_matches('/')
}

fn kv_url(scheme: &str, address: &str) -> InfraResult<Url> {
    let base = if address.contains("://") {
        address.trim_end_matches('/').to_string()
    } else {
        format!("{}://{}", scheme, address.trim_end_matches('/'))
    };
    Url::parse(&format!("{}/v1/kv/", base)).map_err(|e| InfraError::connect(BACKEND, e))
}

fn decode_value(key: &str, value: Option<String>) -> InfraResult<Vec<u8>> {
    match value {
        Some(encoded) => base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| InfraError::backend(BACKEND, format!("bad value for {}: {}", key, e))),
        None => Ok(Vec::new()),
    }
}

impl KvStore for ConsulStore {
    #[instrument(level = "debug", skip(self, value))]
    fn put(&self, key: &str, value: &[u8]) -> InfraResult<()> {
        let resp = self.send(self.client.put(self.url(key, None)?).body(value.to_vec()))?;
        let body = check(resp, key)?
            .text()
            .map_err(|e| InfraError::backend(BACKEND, e))?;
        if body.trim() != "true" {
            return Err(InfraError::backend(
                BACKEND,
                format!("write of {} was rejected", key),
            ));
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn get(&self, key: &str) -> InfraResult<KvPair> {
        let resp = self.send(self.client.get(self.url(key, Some("raw"))?))?;
        let value = check(resp, key)?
            .bytes()
            .map_err(|e| InfraError::backend(BACKEND, e))?;
        Ok(KvPair::new(normalize(key), value.to_vec()))
    }

    #[instrument(level = "debug", skip(self))]
    fn delete(&self, key: &str) -> InfraResult<()> {
        let resp = self.send(self.client.delete(self.url(key, None)?))?;
        check(resp, key)?;
        Ok(())
    }

    /// `?recurse` is a plain prefix match, so the subtree is removed as the
    /// key itself plus everything below `key/`.
    #[instrument(level = "debug", skip(self))]
    fn delete_tree(&self, prefix: &str) -> InfraResult<()> {
        let key = normalize(prefix).trim_end_matches('/');
        if !key.is_empty() {
            let resp = self.send(self.client.delete(self.url(key, None)?))?;
            match check(resp, key) {
                Ok(_) | Err(InfraError::KeyNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        let below = directory_prefix(key);
        let resp = self.send(self.client.delete(self.url(&below, Some("recurse"))?))?;
        check(resp, prefix)?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn list(&self, directory: &str) -> InfraResult<Vec<KvPair>> {
        let prefix = directory_prefix(normalize(directory));
        let resp = self.send(self.client.get(self.url(&prefix, Some("recurse"))?))?;
        let entries: Vec<ConsulEntry> = check(resp, directory)?
            .json()
            .map_err(|e| InfraError::backend(BACKEND, e))?;
        debug!("consul returned {} entries under {:?}", entries.len(), prefix);

        let pairs = entries
            .into_iter()
            .map(|e| {
                let value = decode_value(&e.key, e.value)?;
                Ok(KvPair::new(e.key, value))
            })
            .collect::<InfraResult<Vec<_>>>()?;
        Ok(immediate_children(&prefix, pairs))
    }
}
