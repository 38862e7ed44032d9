// API transport module: the one place that talks HTTP.
//
// The workflow steps only see the `Transport` trait, which is the shared
// request-construction helper of the program: every call carries the
// Authorization header, uploads are multipart and patches are JSON. The
// production implementation wraps a reqwest blocking client; tests swap in a
// scripted transport.

use crate::config::{ApiConfig, AuthScheme};
use crate::error::{Error, Result};
use crate::model::ModelMetadata;
use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LOCATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// What the workflow needs from a response: status, the `Location` header
/// and the body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Multipart upload body. The file reader is owned by the form, so it is
/// closed as soon as the transport is done with it, whatever the outcome.
pub struct UploadForm {
    pub fields: Vec<(&'static str, String)>,
    pub file_name: String,
    pub file: Box<dyn Read + Send>,
    /// Known size lets the body go out with a Content-Length instead of
    /// chunked encoding.
    pub length: Option<u64>,
}

impl UploadForm {
    /// Open `path` and pair it with the metadata fields.
    pub fn open(path: &Path, metadata: &ModelMetadata) -> Result<Self> {
        let file = File::open(path)?;
        let length = file.metadata().ok().map(|m| m.len());
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();
        Ok(Self {
            fields: metadata.form_fields(),
            file_name,
            file: Box::new(file),
            length,
        })
    }
}

impl std::fmt::Debug for UploadForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadForm")
            .field("fields", &self.fields)
            .field("file_name", &self.file_name)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// The three request shapes the workflow issues.
pub trait Transport {
    fn post_multipart(&self, url: &str, form: UploadForm) -> Result<ApiResponse>;
    fn get(&self, url: &str) -> Result<ApiResponse>;
    fn patch_json(&self, url: &str, body: &serde_json::Value) -> Result<ApiResponse>;
}

/// Blocking reqwest transport holding the client and the prepared
/// Authorization header.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    authorization: HeaderValue,
}

impl HttpTransport {
    pub fn new(token: &str, scheme: AuthScheme, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let mut authorization = HeaderValue::from_str(&scheme.header_value(token))?;
        authorization.set_sensitive(true);
        Ok(HttpTransport {
            client,
            authorization,
        })
    }

    /// Build from the `[api]` config section. A token is required.
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        let token = api
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("missing API token".into()))?;
        Self::new(token, api.auth_scheme, api.request_timeout())
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers
    }

    fn read(res: Response) -> Result<ApiResponse> {
        let status = res.status();
        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = res.text()?;
        Ok(ApiResponse {
            status,
            location,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn post_multipart(&self, url: &str, form: UploadForm) -> Result<ApiResponse> {
        tracing::debug!(url, file_name = %form.file_name, "POST multipart");
        let part = match form.length {
            Some(len) => multipart::Part::reader_with_length(form.file, len),
            None => multipart::Part::reader(form.file),
        }
        .file_name(form.file_name)
        .mime_str("application/octet-stream")?;

        let body = form
            .fields
            .into_iter()
            .fold(multipart::Form::new(), |body, (key, value)| body.text(key, value))
            .part("modelFile", part);

        let res = self
            .client
            .post(url)
            .headers(self.auth_headers())
            .multipart(body)
            .send()?;
        Self::read(res)
    }

    fn get(&self, url: &str) -> Result<ApiResponse> {
        tracing::debug!(url, "GET");
        let res = self.client.get(url).headers(self.auth_headers()).send()?;
        Self::read(res)
    }

    fn patch_json(&self, url: &str, body: &serde_json::Value) -> Result<ApiResponse> {
        tracing::debug!(url, "PATCH json");
        let res = self
            .client
            .patch(url)
            .headers(self.auth_headers())
            .json(body)
            .send()?;
        Self::read(res)
    }
}
