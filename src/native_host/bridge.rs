//! `TabHost` implemented as request/response round trips to the extension.

use super::framing::write_message;
use super::messages::{HostOp, IncomingMessage, OutgoingMessage, WindowRef};
use crate::constants::REQUEST_TIMEOUT_SECS;
use crate::error::{AppError, Result};
use crate::host::TabHost;
use crate::models::{Tab, TabId, WindowId};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Result of waiting for the next event.
#[derive(Debug, PartialEq)]
pub enum Poll {
    Message(IncomingMessage),
    /// The wait elapsed with nothing to do.
    Idle,
    /// The extension closed the connection.
    Closed,
}

pub struct NativeBridge<W> {
    writer: W,
    inbox: Receiver<IncomingMessage>,
    /// Events that arrived while a request was waiting for its response.
    backlog: VecDeque<IncomingMessage>,
    next_request_id: u64,
    timeout: Duration,
    closed: bool,
}

impl<W: Write> NativeBridge<W> {
    pub fn new(writer: W, inbox: Receiver<IncomingMessage>) -> Self {
        Self::with_timeout(writer, inbox, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(writer: W, inbox: Receiver<IncomingMessage>, timeout: Duration) -> Self {
        Self {
            writer,
            inbox,
            backlog: VecDeque::new(),
            next_request_id: 1,
            timeout,
            closed: false,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Next event to handle: queued events first, then the channel.
    /// `None` waits indefinitely.
    pub fn next_message(&mut self, wait: Option<Duration>) -> Poll {
        if let Some(message) = self.backlog.pop_front() {
            return Poll::Message(message);
        }
        if self.closed {
            return Poll::Closed;
        }

        let received = match wait {
            Some(wait) => self.inbox.recv_timeout(wait),
            None => self.inbox.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(message) => Poll::Message(message),
            Err(RecvTimeoutError::Timeout) => Poll::Idle,
            Err(RecvTimeoutError::Disconnected) => {
                self.closed = true;
                Poll::Closed
            }
        }
    }

    fn request(&mut self, op: HostOp) -> Result<Value> {
        if self.closed {
            return Err(AppError::Disconnected);
        }
        let operation = op.name();
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        write_message(&mut self.writer, &OutgoingMessage::Request { request_id, op })?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(AppError::Timeout { operation });
            }

            match self.inbox.recv_timeout(remaining) {
                Ok(IncomingMessage::Response {
                    request_id: id,
                    result,
                    error,
                }) if id == request_id => {
                    if let Some(error) = error {
                        return Err(AppError::Host(error));
                    }
                    return Ok(result.unwrap_or(Value::Null));
                }
                Ok(IncomingMessage::Response { request_id: id, .. }) => {
                    debug!("Discarding late response {id} while waiting for {request_id}");
                }
                Ok(event) => self.backlog.push_back(event),
                Err(RecvTimeoutError::Timeout) => {
                    warn!("Request {request_id} ({operation}) timed out");
                    return Err(AppError::Timeout { operation });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.closed = true;
                    return Err(AppError::Disconnected);
                }
            }
        }
    }

    fn request_as<T: DeserializeOwned>(&mut self, op: HostOp) -> Result<T> {
        let value = self.request(op)?;
        Ok(serde_json::from_value(value)?)
    }
}

impl<W: Write> TabHost for NativeBridge<W> {
    fn get_tab(&mut self, tab_id: TabId) -> Result<Option<Tab>> {
        self.request_as(HostOp::GetTab { tab_id })
    }

    fn query_tabs(&mut self, window_id: Option<WindowId>) -> Result<Vec<Tab>> {
        self.request_as(HostOp::QueryTabs { window_id })
    }

    fn list_windows(&mut self) -> Result<Vec<WindowId>> {
        let windows: Vec<WindowRef> = self.request_as(HostOp::GetWindows)?;
        Ok(windows.into_iter().map(|window| window.id).collect())
    }

    fn remove_tabs(&mut self, tab_ids: &[TabId]) -> Result<()> {
        self.request(HostOp::RemoveTabs {
            tab_ids: tab_ids.to_vec(),
        })?;
        Ok(())
    }
}
