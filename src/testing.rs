// Test doubles shared by the unit tests: a scripted transport that records
// what it was asked to send, a sleeper that only counts, and a reader that
// reports when it has been dropped.

use crate::api::{ApiResponse, Transport, UploadForm};
use crate::error::{Error, Result};
use crate::poller::Sleeper;
use reqwest::StatusCode;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Post {
        url: String,
        fields: Vec<(&'static str, String)>,
        file_name: String,
    },
    Get {
        url: String,
    },
    Patch {
        url: String,
        body: serde_json::Value,
    },
}

/// Answers requests from a queue, in order.
pub struct MockTransport {
    responses: RefCell<VecDeque<Result<ApiResponse>>>,
    requests: RefCell<Vec<Request>>,
}

impl MockTransport {
    pub fn new(responses: Vec<Result<ApiResponse>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    fn next(&self, request: Request) -> Result<ApiResponse> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Config("no scripted response left".into())))
    }
}

impl Transport for MockTransport {
    fn post_multipart(&self, url: &str, form: UploadForm) -> Result<ApiResponse> {
        let request = Request::Post {
            url: url.to_string(),
            fields: form.fields.clone(),
            file_name: form.file_name.clone(),
        };
        drop(form);
        self.next(request)
    }

    fn get(&self, url: &str) -> Result<ApiResponse> {
        self.next(Request::Get {
            url: url.to_string(),
        })
    }

    fn patch_json(&self, url: &str, body: &serde_json::Value) -> Result<ApiResponse> {
        self.next(Request::Patch {
            url: url.to_string(),
            body: body.clone(),
        })
    }
}

pub fn response(status: u16, body: &str) -> ApiResponse {
    ApiResponse {
        status: StatusCode::from_u16(status).unwrap(),
        location: None,
        body: body.to_string(),
    }
}

/// A 200 model body reporting `processing`.
pub fn status(processing: &str) -> Result<ApiResponse> {
    Ok(response(
        200,
        &format!(r#"{{"status": {{"processing": "{}"}}}}"#, processing),
    ))
}

pub fn transport_error() -> Result<ApiResponse> {
    Err(Error::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    )))
}

#[derive(Default)]
pub struct CountingSleeper {
    slept: RefCell<Vec<Duration>>,
}

impl CountingSleeper {
    pub fn count(&self) -> usize {
        self.slept.borrow().len()
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Sleeper for CountingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

#[derive(Clone, Default)]
pub struct DropFlag(Arc<AtomicBool>);

impl DropFlag {
    pub fn wrap<R: Read>(&self, inner: R) -> FlaggedReader<R> {
        FlaggedReader {
            inner,
            flag: self.0.clone(),
        }
    }

    pub fn dropped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct FlaggedReader<R> {
    inner: R,
    flag: Arc<AtomicBool>,
}

impl<R: Read> Read for FlaggedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R> Drop for FlaggedReader<R> {
    fn drop(&mut self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}
