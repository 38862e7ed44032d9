// Upload, poll, patch: the three steps chained strictly forward.

use crate::api::Transport;
use crate::config::Config;
use crate::patcher::{self, PatchReport};
use crate::poller::{PollOutcome, Poller, Sleeper};
use crate::uploader;

/// What happened at each step. Later fields are `None` when an earlier
/// step stopped the run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkflowReport {
    pub model_url: Option<String>,
    pub poll: Option<PollOutcome>,
    pub patch: Option<PatchReport>,
}

impl WorkflowReport {
    /// The model was uploaded and processed. Patch failures do not count
    /// against the run.
    pub fn is_success(&self) -> bool {
        self.poll.as_ref().is_some_and(PollOutcome::is_success)
    }
}

/// Run the whole workflow. Never fails; every problem is logged and ends
/// the run early with a partial report.
pub fn run(config: &Config, transport: &dyn Transport, sleeper: &dyn Sleeper) -> WorkflowReport {
    let mut report = WorkflowReport::default();

    let Some(path) = config.model.file.as_deref() else {
        tracing::error!("No model file configured");
        return report;
    };

    let Some(model_url) = uploader::upload_file(
        transport,
        &config.models_endpoint(),
        path,
        &config.model.metadata,
    ) else {
        return report;
    };
    report.model_url = Some(model_url.clone());

    let outcome = Poller::from_config(&config.polling).poll(transport, sleeper, &model_url);
    let processed = outcome.is_success();
    report.poll = Some(outcome);
    if !processed {
        return report;
    }

    if config.patch.enabled {
        report.patch = Some(patcher::apply(
            transport,
            &model_url,
            &config.patch.metadata,
            &config.patch.options,
        ));
    } else {
        tracing::info!("Patching disabled, done");
    }

    report
}
