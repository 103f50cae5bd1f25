use crate::config::Config;
use crate::model::adapter::{RemoteRequest, events_from_response, to_remote_value};
use crate::model::{Event, EventId};

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use http::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use http::{Request, Uri};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

/// Spreadsheet script URLs answer `GET` with a redirect to the rendered output.
const MAX_REDIRECTS: usize = 5;

/// Upper bound for one remote call, redirects included.
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs a remote call, failing it once `limit` has elapsed.
pub async fn call_with_timeout<T, F>(limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    timeout(limit, call)
        .await
        .map_err(|_| anyhow!("Remote call timed out after {:?}", limit))?
}

/// The remote list/upsert/delete contract. The store only ever talks to this.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Event>>;
    async fn upsert(&self, event: &Event) -> Result<()>;
    async fn delete(&self, id: EventId) -> Result<()>;
}

#[derive(Clone)]
struct Endpoint {
    url: String,
    http: HttpsClient,
}

/// HTTP client for the spreadsheet endpoint. Built without a URL it stays offline
/// and every call fails fast.
#[derive(Clone)]
pub struct RemoteClient {
    endpoint: Option<Endpoint>,
}

impl RemoteClient {
    pub fn new(url: &str, insecure: bool) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(Self::offline());
        }

        let _: Uri = url
            .parse()
            .with_context(|| format!("Invalid endpoint URL {}", url))?;

        let https_connector = if insecure {
            let tls_config = rustls::ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerifier))
                .with_no_client_auth();

            HttpsConnectorBuilder::new()
                .with_tls_config(tls_config)
                .https_or_http()
                .enable_http1()
                .build()
        } else {
            let mut root_store = rustls::RootCertStore::empty();
            let result = rustls_native_certs::load_native_certs();
            root_store.add_parsable_certificates(result.certs);

            if root_store.is_empty() {
                bail!("No valid system certificates found.");
            }

            let tls_config = rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();

            HttpsConnectorBuilder::new()
                .with_tls_config(tls_config)
                .https_or_http()
                .enable_http1()
                .build()
        };

        let http = Client::builder(TokioExecutor::new()).build(https_connector);
        Ok(Self {
            endpoint: Some(Endpoint {
                url: url.to_string(),
                http,
            }),
        })
    }

    pub fn offline() -> Self {
        Self { endpoint: None }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.endpoint_url, config.allow_insecure_certs)
    }

    pub fn is_offline(&self) -> bool {
        self.endpoint.is_none()
    }

    fn endpoint(&self) -> Result<&Endpoint> {
        self.endpoint.as_ref().ok_or_else(|| anyhow!("Offline"))
    }

    async fn post(&self, request: &RemoteRequest) -> Result<()> {
        let endpoint = self.endpoint()?;
        // Plain text keeps script endpoints from demanding a CORS preflight.
        let req = Request::builder()
            .method("POST")
            .uri(endpoint.url.as_str())
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(serde_json::to_string(request)?)?;

        let resp = endpoint.http.request(req).await?;
        let status = resp.status();
        // The script has run by the time it redirects to its output.
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            bail!("Endpoint answered {}", status)
        }
    }
}

#[async_trait]
impl RemoteStore for RemoteClient {
    async fn list(&self) -> Result<Vec<Event>> {
        let endpoint = self.endpoint()?;
        let mut uri: Uri = with_query(&endpoint.url, "action=list").parse()?;

        for _ in 0..=MAX_REDIRECTS {
            let req = Request::builder()
                .method("GET")
                .uri(uri.clone())
                .header(ACCEPT, "application/json")
                .body(String::new())?;
            let resp = endpoint.http.request(req).await?;
            let status = resp.status();

            if status.is_redirection() {
                let location = resp
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .context("Redirect without a Location header")?;
                uri = resolve_location(&uri, location)?;
                log::debug!("Following redirect to {}", uri);
                continue;
            }

            let body = resp.into_body().collect().await?.to_bytes();
            if !status.is_success() {
                bail!("Listing events failed: {}", status);
            }
            let events = events_from_response(&body)?;
            log::debug!("Fetched {} remote events", events.len());
            return Ok(events);
        }
        bail!("Too many redirects while listing events")
    }

    async fn upsert(&self, event: &Event) -> Result<()> {
        let request = RemoteRequest::Upsert {
            event: to_remote_value(event)?,
        };
        self.post(&request)
            .await
            .with_context(|| format!("Upsert of event {} failed", event.id))
    }

    async fn delete(&self, id: EventId) -> Result<()> {
        self.post(&RemoteRequest::Delete { id })
            .await
            .with_context(|| format!("Delete of event {} failed", id))
    }
}

fn with_query(url: &str, query: &str) -> String {
    if url.contains('?') {
        format!("{}&{}", url, query)
    } else {
        format!("{}?{}", url, query)
    }
}

fn resolve_location(current: &Uri, location: &str) -> Result<Uri> {
    if location.starts_with('/') {
        let scheme = current.scheme_str().unwrap_or("https");
        let authority = current
            .authority()
            .map(|a| a.as_str())
            .context("Redirect from a URL without host")?;
        return Ok(format!("{}://{}{}", scheme, authority, location).parse()?);
    }
    Ok(location.parse()?)
}

#[derive(Debug)]
struct NoVerifier;
impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &[rustls::pki_types::CertificateDer<'_>],
        _: &rustls::pki_types::ServerName<'_>,
        _: &[u8],
        _: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }
    fn verify_tls12_signature(
        &self,
        _: &[u8],
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }
    fn verify_tls13_signature(
        &self,
        _: &[u8],
        _: &rustls::pki_types::CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }
    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        use rustls::SignatureScheme::*;
        vec![
            RSA_PKCS1_SHA256,
            RSA_PKCS1_SHA384,
            RSA_PKCS1_SHA512,
            ECDSA_NISTP256_SHA256,
            RSA_PSS_SHA256,
            ED25519,
        ]
    }
}
