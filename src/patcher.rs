// Step 3: PATCH the model's metadata, then its view options.
//
// The two calls are independent. A failure is logged and reported in the
// returned outcome; it never stops the other call.

use crate::api::Transport;
use crate::model::{ModelPatch, ViewOptions};
use reqwest::StatusCode;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    Rejected { status: u16, body: String },
    Error(String),
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub metadata: PatchOutcome,
    pub options: PatchOutcome,
}

/// `{model url}/options`
pub fn options_url(model_url: &str) -> String {
    format!("{}/options", model_url.trim_end_matches('/'))
}

pub fn patch_model(transport: &dyn Transport, model_url: &str, patch: &ModelPatch) -> PatchOutcome {
    send(transport, model_url, patch, "model")
}

pub fn patch_options(
    transport: &dyn Transport,
    model_url: &str,
    options: &ViewOptions,
) -> PatchOutcome {
    send(transport, &options_url(model_url), options, "options")
}

/// Both patches, in order.
pub fn apply(
    transport: &dyn Transport,
    model_url: &str,
    patch: &ModelPatch,
    options: &ViewOptions,
) -> PatchReport {
    let metadata = patch_model(transport, model_url, patch);
    let options = patch_options(transport, model_url, options);
    PatchReport { metadata, options }
}

fn send<T: Serialize>(transport: &dyn Transport, url: &str, payload: &T, what: &str) -> PatchOutcome {
    let body = match serde_json::to_value(payload) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(endpoint = what, error = %e, "Could not encode PATCH body");
            return PatchOutcome::Error(e.to_string());
        }
    };

    match transport.patch_json(url, &body) {
        Err(e) => {
            tracing::error!(endpoint = what, error = %e, "PATCH request failed");
            PatchOutcome::Error(e.to_string())
        }
        Ok(res) if res.status != StatusCode::NO_CONTENT => {
            tracing::error!(
                endpoint = what,
                status = %res.status,
                body = %res.body,
                "PATCH rejected"
            );
            PatchOutcome::Rejected {
                status: res.status.as_u16(),
                body: res.body,
            }
        }
        Ok(_) => {
            tracing::info!(endpoint = what, "PATCH successful");
            PatchOutcome::Applied
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Background;
    use crate::testing::{response, transport_error, MockTransport, Request};
    use serde_json::json;

    const URL: &str = "https://api.sketchfab.com/v3/models/abc123";

    fn rename() -> ModelPatch {
        ModelPatch {
            name: Some("A super Bob model".into()),
            ..Default::default()
        }
    }

    fn white() -> ViewOptions {
        ViewOptions {
            shading: Some("shadeless".into()),
            background: Some(Background {
                color: "#FFFFFF".into(),
            }),
            orientation: None,
        }
    }

    #[test]
    fn test_both_patches_applied() {
        let transport = MockTransport::new(vec![Ok(response(204, "")), Ok(response(204, ""))]);

        let report = apply(&transport, URL, &rename(), &white());

        assert!(report.metadata.is_applied());
        assert!(report.options.is_applied());
        assert_eq!(
            transport.requests(),
            vec![
                Request::Patch {
                    url: URL.into(),
                    body: json!({"name": "A super Bob model"}),
                },
                Request::Patch {
                    url: format!("{}/options", URL),
                    body: json!({
                        "shading": "shadeless",
                        "background": "{\"color\":\"#FFFFFF\"}"
                    }),
                },
            ]
        );
    }

    #[test]
    fn test_options_sent_after_metadata_transport_error() {
        let transport = MockTransport::new(vec![transport_error(), Ok(response(204, ""))]);

        let report = apply(&transport, URL, &rename(), &white());

        assert!(matches!(report.metadata, PatchOutcome::Error(_)));
        assert!(report.options.is_applied());
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn test_options_sent_after_metadata_rejected() {
        let transport = MockTransport::new(vec![
            Ok(response(400, r#"{"name": ["too long"]}"#)),
            Ok(response(403, "forbidden")),
        ]);

        let report = apply(&transport, URL, &rename(), &white());

        assert_eq!(
            report.metadata,
            PatchOutcome::Rejected {
                status: 400,
                body: r#"{"name": ["too long"]}"#.into()
            }
        );
        assert!(matches!(report.options, PatchOutcome::Rejected { status: 403, .. }));
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn test_empty_payloads_are_still_sent() {
        let transport = MockTransport::new(vec![Ok(response(204, "")), Ok(response(204, ""))]);

        apply(&transport, URL, &ModelPatch::default(), &ViewOptions::default());

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1],
            Request::Patch {
                url: format!("{}/options", URL),
                body: json!({})
            }
        );
    }

    #[test]
    fn test_options_url_trims_trailing_slash() {
        assert_eq!(options_url("http://x/models/1/"), "http://x/models/1/options");
    }
}
