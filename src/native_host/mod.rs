//! Chrome native messaging host.
//!
//! The extension forwards browser events over stdin and performs the browser
//! calls the engine asks for. A reader thread decodes frames onto a channel;
//! the main loop handles one event at a time and fires timers when their
//! deadline passes.

pub mod bridge;
pub mod framing;
pub mod messages;

pub use bridge::{NativeBridge, Poll};
pub use messages::{HostOp, IncomingMessage, OutgoingMessage};

use crate::clock::{Clock, SystemClock};
use crate::db::Database;
use crate::engine::TabLifecycle;
use crate::error::{AppError, Result};
use crate::models::Settings;
use crate::validation::{validate_protected_domains, validate_timeout_minutes};
use framing::read_frame;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::io::{self, Read, Write};
use std::sync::mpsc::{channel, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Decode frames from `reader` on a background thread.
///
/// Malformed JSON frames are skipped. The channel closes when input ends or
/// a frame cannot be read.
pub fn spawn_reader<R: Read + Send + 'static>(
    mut reader: R,
) -> io::Result<(Receiver<IncomingMessage>, JoinHandle<()>)> {
    let (tx, rx) = channel();
    let handle = thread::Builder::new()
        .name("native-host-reader".into())
        .spawn(move || loop {
            let body = match read_frame(&mut reader) {
                Ok(body) => body,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    info!("Extension closed the connection");
                    break;
                }
                Err(e) => {
                    error!("Failed to read native message: {e}");
                    break;
                }
            };

            match serde_json::from_slice::<IncomingMessage>(&body) {
                Ok(message) => {
                    if tx.send(message).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Skipping malformed message: {e}"),
            }
        })?;
    Ok((rx, handle))
}

pub struct NativeHost<W, C = SystemClock> {
    engine: TabLifecycle<NativeBridge<W>, Database, C>,
}

impl<W: Write> NativeHost<W, SystemClock> {
    pub fn new(bridge: NativeBridge<W>, db: Database) -> Self {
        Self::with_clock(bridge, db, SystemClock)
    }
}

impl<W: Write, C: Clock> NativeHost<W, C> {
    pub fn with_clock(bridge: NativeBridge<W>, db: Database, clock: C) -> Self {
        Self {
            engine: TabLifecycle::with_clock(bridge, db, clock),
        }
    }

    pub fn engine(&self) -> &TabLifecycle<NativeBridge<W>, Database, C> {
        &self.engine
    }

    /// Process events until the extension disconnects.
    pub fn run(&mut self) {
        loop {
            self.engine.fire_due_timers();

            let wait = self
                .engine
                .millis_until_next_deadline()
                .map(|ms| Duration::from_millis(u64::try_from(ms).unwrap_or(0)));

            match self.engine.host_mut().next_message(wait) {
                Poll::Message(message) => self.handle_message(message),
                Poll::Idle => {}
                Poll::Closed => break,
            }
        }
        info!("Native host stopped");
    }

    pub fn handle_message(&mut self, message: IncomingMessage) {
        match message {
            IncomingMessage::Startup | IncomingMessage::Installed => self.engine.initialize(),
            IncomingMessage::TabActivated {
                tab_id,
                window_id,
                previous_tab_id,
            } => self
                .engine
                .on_tab_activated(tab_id, window_id, previous_tab_id),
            IncomingMessage::TabUpdated { tab_id, change_info } => {
                self.engine.on_tab_updated(tab_id, &change_info);
            }
            IncomingMessage::TabRemoved { tab_id } => self.engine.on_tab_removed(tab_id),
            IncomingMessage::WindowRemoved { window_id } => {
                self.engine.on_window_removed(window_id);
            }
            IncomingMessage::ActionClicked { tab } => {
                self.engine.close_other_tabs(&tab);
            }
            IncomingMessage::UpdateTimeout { timeout } => {
                if let Err(e) = self.update_timeout(&timeout) {
                    warn!("Rejected timeout update: {e}");
                }
            }
            IncomingMessage::UpdateProtectedDomains { domains } => {
                if let Err(e) = self.update_protected_domains(&domains) {
                    warn!("Rejected protected domains update: {e}");
                }
            }
            IncomingMessage::Response { request_id, .. } => {
                debug!("Ignoring response {request_id} with no pending request");
            }
            IncomingMessage::Unknown => debug!("Ignoring unknown message type"),
        }
    }

    fn update_timeout(&mut self, timeout: &Value) -> Result<()> {
        let minutes = timeout.as_i64().ok_or_else(|| AppError::InvalidInput {
            field: "timeout",
            reason: format!("expected a whole number of minutes, got {timeout}"),
        })?;
        let minutes = validate_timeout_minutes(minutes)?;

        Settings::save_timeout_minutes(self.engine.store().connection(), minutes)?;
        self.engine.on_timeout_changed(minutes);
        Ok(())
    }

    fn update_protected_domains(&mut self, entries: &[String]) -> Result<()> {
        let domains = validate_protected_domains(entries)?;

        Settings::save_protected_domains(self.engine.store().connection(), &domains)?;
        self.engine.on_protected_domains_changed(domains);
        Ok(())
    }
}
