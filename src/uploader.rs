// Step 1: POST the model file and metadata to `{api}/models`.

use crate::api::{Transport, UploadForm};
use crate::model::ModelMetadata;
use reqwest::StatusCode;
use std::path::Path;

/// Open `path` and upload it. Returns the created model's URL, or `None`
/// when the file could not be read or the upload was not accepted.
pub fn upload_file(
    transport: &dyn Transport,
    endpoint: &str,
    path: &Path,
    metadata: &ModelMetadata,
) -> Option<String> {
    tracing::info!(file = %path.display(), "Uploading model");
    let form = match UploadForm::open(path, metadata) {
        Ok(form) => form,
        Err(e) => {
            tracing::error!(file = %path.display(), error = %e, "Could not open model file");
            return None;
        }
    };
    upload(transport, endpoint, form)
}

/// Send an already prepared form. The form, and with it the file handle,
/// is consumed by the transport on every path.
pub fn upload(transport: &dyn Transport, endpoint: &str, form: UploadForm) -> Option<String> {
    let res = match transport.post_multipart(endpoint, form) {
        Ok(res) => res,
        Err(e) => {
            tracing::error!(error = %e, "Upload request failed");
            return None;
        }
    };

    if res.status != StatusCode::CREATED {
        tracing::error!(status = %res.status, body = %res.body, "Upload failed");
        return None;
    }

    match res.location {
        Some(model_url) => {
            tracing::info!(
                model_url = %model_url,
                "Upload successful, the model is being processed"
            );
            Some(model_url)
        }
        None => {
            tracing::error!("Upload accepted but the response has no Location header");
            None
        }
    }
}
