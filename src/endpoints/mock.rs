//! A scripted [`Transport`] for tests.

use super::{EndpointError, Request, Response, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::VecDeque,
    io::{Error as IoError, ErrorKind},
    sync::Mutex,
};

#[derive(Debug)]
enum Scripted {
    Reply(Response),
    Unreachable,
}

/// Hands out canned responses in order and remembers every request.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self { MockTransport::default() }

    pub(crate) fn reply(self, status: u16, body: Value) -> Self {
        let body = serde_json::to_vec(&body).unwrap();
        self.reply_raw(status, body)
    }

    pub(crate) fn reply_raw<B: Into<Vec<u8>>>(self, status: u16, body: B) -> Self {
        self.push(Scripted::Reply(Response::new(status, body)))
    }

    pub(crate) fn unreachable(self) -> Self { self.push(Scripted::Unreachable) }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn push(self, item: Scripted) -> Self {
        self.script.lock().unwrap().push_back(item);
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, request: Request) -> Result<Response, EndpointError> {
        self.requests.lock().unwrap().push(request);

        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::Unreachable) => Err(EndpointError::Connection(
                IoError::new(ErrorKind::ConnectionRefused, "connection refused"),
            )),
            None => Err(EndpointError::Connection(IoError::new(
                ErrorKind::Other,
                "no response was scripted",
            ))),
        }
    }
}
