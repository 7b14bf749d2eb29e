//! Test doubles for the transport and sleeper seams
//!
//! Compiled for this crate's unit tests, and for other crates through
//! the `testing` feature.

use crate::error::TransportError;
use crate::retry::Sleeper;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

type Reply = Result<HttpResponse, TransportError>;

/// Replays a fixed script of replies and records every request.
///
/// Once the script runs out the last reply is repeated.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request gets the same reply
    pub fn repeating(reply: Reply) -> Self {
        Self::new([reply])
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());

        let next = self.script.lock().pop_front();
        let mut last = self.last.lock();
        match next {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(TransportError::Network("script exhausted".to_string()))),
        }
    }
}

/// Records requested delays without sleeping
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().push(duration);
    }
}
