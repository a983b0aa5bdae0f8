//! Cross-thread dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! accept thread                          owner thread
//!   Dispatcher::dispatch(route, input)
//!     → bounded channel  ───────────────→  OwnerPump::drain(&store)
//!     ← oneshot reply    ←───────────────    PendingWork::execute (formatter)
//!   (waits, or gives up on shutdown)
//! ```
//!
//! # Design Decisions
//! - Report data is only read inside `OwnerPump::drain`, on the thread that
//!   called `ReportServer::start`; the pump is not `Send`
//! - The owner drains on its own tick; nothing blocks the owner thread
//! - A panicking handler faults one request, never the pump

use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};

use crate::http::response;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::report::ReportStore;
use crate::routing::Route;

/// One request waiting to be rendered on the owner thread.
#[derive(Debug)]
pub struct PendingWork {
    pub route: Route,
    /// Raw request body, if any.
    pub input: Option<String>,
    reply: oneshot::Sender<Option<String>>,
}

impl PendingWork {
    /// Render the route against `store` and hand the payload back. Must run
    /// on the owner thread.
    pub fn execute<S: ReportStore + ?Sized>(self, store: &S) {
        let PendingWork { route, input, reply } = self;
        let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
            response::render(store, &route, input.as_deref())
        }));
        match rendered {
            Ok(payload) => {
                // The requester is gone if shutdown raced us.
                let _ = reply.send(payload);
            }
            Err(_) => {
                tracing::error!(
                    report = %route.report,
                    request = %route.kind,
                    "Report handler panicked"
                );
            }
        }
    }
}

/// Result of waiting for the owner thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// The owner rendered the route; `None` means nothing matched.
    Completed(Option<String>),
    /// Shutdown fired before the owner answered.
    Cancelled,
    /// The owner dropped the work or the pump is gone.
    Faulted,
}

/// Accept-thread side of the channel.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<PendingWork>,
    shutdown: ShutdownSignal,
}

impl Dispatcher {
    /// Queue `route` for the owner thread and wait for its payload.
    pub async fn dispatch(&self, route: Route, input: Option<String>) -> Dispatched {
        let (reply, response) = oneshot::channel();
        let work = PendingWork {
            route,
            input,
            reply,
        };

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Dispatched::Cancelled,
            sent = self.tx.send(work) => {
                if sent.is_err() {
                    return Dispatched::Faulted;
                }
            }
        }

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Dispatched::Cancelled,
            payload = response => match payload {
                Ok(payload) => Dispatched::Completed(payload),
                Err(_) => Dispatched::Faulted,
            },
        }
    }
}

/// Owner-thread side of the channel.
#[derive(Debug)]
pub struct OwnerPump {
    rx: mpsc::Receiver<PendingWork>,
    disconnected: bool,
    _owner: PhantomData<*const ()>,
}

impl OwnerPump {
    /// Execute every queued unit of work without blocking. Returns how many
    /// ran.
    pub fn drain<S: ReportStore + ?Sized>(&mut self, store: &S) -> usize {
        let mut handled = 0;
        loop {
            match self.rx.try_recv() {
                Ok(work) => {
                    work.execute(store);
                    handled += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        handled
    }

    /// Whether the accept side has gone away (the service stopped).
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

/// Create a connected dispatcher and pump.
pub fn channel(capacity: usize, shutdown: ShutdownSignal) -> (Dispatcher, OwnerPump) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        Dispatcher { tx, shutdown },
        OwnerPump {
            rx,
            disconnected: false,
            _owner: PhantomData,
        },
    )
}
