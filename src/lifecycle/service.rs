//! Start/stop of the report service.
//!
//! `ReportServer` is owned by whatever component hosts the report data. The
//! thread that calls [`ReportServer::start`] becomes the owner thread: it
//! receives the [`OwnerPump`] and must drain it on its regular tick.

use std::thread;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

use crate::config::ServiceConfig;
use crate::dispatch::{self, OwnerPump};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::state::ListenerState;
use crate::lifecycle::supervisor::Supervisor;
use crate::net::ListenerError;

/// Errors surfaced by `start`/`stop`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("report server is already running")]
    AlreadyRunning,
    #[error("failed to build listener runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to spawn listener thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error("listener thread panicked")]
    WorkerPanicked,
}

struct Running {
    shutdown: Shutdown,
    worker: thread::JoinHandle<Result<(), ListenerError>>,
    state: watch::Receiver<ListenerState>,
}

/// The local report query service.
pub struct ReportServer {
    config: ServiceConfig,
    running: Option<Running>,
}

impl ReportServer {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            running: None,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Spawn the listener thread and return immediately. The returned pump
    /// belongs to the calling thread.
    pub fn start(&mut self) -> Result<OwnerPump, ServiceError> {
        if self.running.is_some() {
            return Err(ServiceError::AlreadyRunning);
        }

        let shutdown = Shutdown::new();
        let (dispatcher, pump) =
            dispatch::channel(self.config.dispatch.queue_capacity, shutdown.subscribe());
        let (state_tx, state_rx) = watch::channel(ListenerState::Starting { attempt: 0 });

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ServiceError::Runtime)?;
        let supervisor = Supervisor::new(
            self.config.clone(),
            dispatcher,
            shutdown.subscribe(),
            state_tx,
        );

        let worker = thread::Builder::new()
            .name("report-server".to_string())
            .spawn(move || runtime.block_on(supervisor.run()))
            .map_err(ServiceError::Spawn)?;

        tracing::info!(port = self.config.port, "Report server starting");
        self.running = Some(Running {
            shutdown,
            worker,
            state: state_rx,
        });
        Ok(pump)
    }

    /// Signal shutdown, wait for the listener thread to exit, and report how
    /// it ended. A bind failure that exhausted its retries surfaces here.
    /// No-op when not running.
    pub fn stop(&mut self) -> Result<(), ServiceError> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };

        running.shutdown.trigger();
        let outcome = running
            .worker
            .join()
            .map_err(|_| ServiceError::WorkerPanicked)?;
        tracing::info!("Report server stopped");
        outcome.map_err(ServiceError::from)
    }

    /// Current listener state.
    pub fn state(&self) -> ListenerState {
        self.running
            .as_ref()
            .map(|r| r.state.borrow().clone())
            .unwrap_or(ListenerState::Stopped)
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Block until the listener is running, has failed to start, or
    /// `timeout` passes. Returns the last observed state. Must not be called
    /// from inside an async runtime.
    pub fn wait_until_settled(&self, timeout: Duration) -> ListenerState {
        let Some(running) = self.running.as_ref() else {
            return ListenerState::Stopped;
        };

        let mut state = running.state.clone();
        let waiter = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build();
        match waiter {
            Ok(rt) => {
                // A closed channel means the listener thread already exited.
                let _ = rt.block_on(tokio::time::timeout(
                    timeout,
                    state.wait_for(ListenerState::is_settled),
                ));
            }
            Err(e) => tracing::warn!(error = %e, "Cannot wait for listener state"),
        }
        self.state()
    }
}

impl Drop for ReportServer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "Report server stopped with error");
        }
    }
}
