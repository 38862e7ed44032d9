// Step 2: poll the model URL until processing reaches a terminal state.
//
// Two budgets bound the loop: `max_retries` attempts in total and
// `max_errors` failed attempts (transport errors, non-200 responses or
// unreadable bodies). Whichever runs out first ends polling. Every
// non-terminal answer and every error waits a fixed interval before the
// next attempt; there is no backoff growth.

use crate::api::Transport;
use crate::config::PollingConfig;
use crate::model::{ModelResource, ProcessingStatus};
use reqwest::StatusCode;
use std::time::Duration;

/// Blocking wait between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Succeeded,
    /// The service reported FAILED.
    Failed { reason: String },
    /// A budget ran out before a terminal state was seen.
    Exhausted { attempts: u32, errors: u32 },
}

impl PollOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Succeeded)
    }
}

/// What a single attempt observed.
enum Attempt {
    Terminal(PollOutcome),
    Waiting(ProcessingStatus),
    Error,
}

#[derive(Debug, Clone)]
pub struct Poller {
    pub max_retries: u32,
    pub max_errors: u32,
    pub retry_interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self::from_config(&PollingConfig::default())
    }
}

impl Poller {
    pub fn from_config(config: &PollingConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            max_errors: config.max_errors,
            retry_interval: Duration::from_secs(config.retry_interval_secs),
        }
    }

    pub fn poll(
        &self,
        transport: &dyn Transport,
        sleeper: &dyn Sleeper,
        model_url: &str,
    ) -> PollOutcome {
        let mut attempts = 0;
        let mut errors = 0;

        tracing::info!(model_url, "Start polling processing status");

        while attempts < self.max_retries && errors < self.max_errors {
            tracing::debug!(attempt = attempts, "Polling processing status");

            let should_wait = match self.attempt(transport, model_url) {
                Attempt::Terminal(outcome) => return outcome,
                Attempt::Waiting(ProcessingStatus::Unknown(status)) => {
                    tracing::warn!(status = %status, "Unknown processing status");
                    attempts += 1;
                    false
                }
                Attempt::Waiting(status) => {
                    tracing::info!(
                        status = %status,
                        retry_in_secs = self.retry_interval.as_secs(),
                        "Model not processed yet"
                    );
                    attempts += 1;
                    true
                }
                Attempt::Error => {
                    attempts += 1;
                    errors += 1;
                    true
                }
            };

            if should_wait && attempts < self.max_retries && errors < self.max_errors {
                sleeper.sleep(self.retry_interval);
            }
        }

        tracing::warn!(
            attempts,
            errors,
            "Stopped polling after too many retries or too many errors"
        );
        PollOutcome::Exhausted { attempts, errors }
    }

    fn attempt(&self, transport: &dyn Transport, model_url: &str) -> Attempt {
        let res = match transport.get(model_url) {
            Ok(res) => res,
            Err(e) => {
                tracing::warn!(error = %e, "Polling request failed");
                return Attempt::Error;
            }
        };

        let resource = res.json::<ModelResource>();

        if res.status != StatusCode::OK {
            let detail = match &resource {
                Ok(resource) => resource.error_message(),
                Err(_) => res.body.clone(),
            };
            tracing::warn!(status = %res.status, error = %detail, "Polling returned an error");
            return Attempt::Error;
        }

        let resource = match resource {
            Ok(resource) => resource,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable model body");
                return Attempt::Error;
            }
        };

        match resource.processing_status() {
            Some(ProcessingStatus::Succeeded) => {
                tracing::info!(model_url, "Processing successful");
                Attempt::Terminal(PollOutcome::Succeeded)
            }
            Some(ProcessingStatus::Failed) => {
                let reason = resource.error_message();
                tracing::error!(reason = %reason, "Processing failed");
                Attempt::Terminal(PollOutcome::Failed { reason })
            }
            Some(status) => Attempt::Waiting(status.clone()),
            None => {
                tracing::warn!("Model body has no processing status");
                Attempt::Error
            }
        }
    }
}
