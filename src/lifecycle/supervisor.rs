//! Listener thread entry point: bind with retry, then serve.

use tokio::sync::watch;

use crate::config::ServiceConfig;
use crate::dispatch::Dispatcher;
use crate::http::ReportHttpServer;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::lifecycle::state::ListenerState;
use crate::net::{loopback_targets, Listener, ListenerError};
use crate::observability::metrics;
use crate::resilience::{retry_transient, RetryPolicy};

/// Everything the listener thread owns.
pub struct Supervisor {
    config: ServiceConfig,
    dispatcher: Dispatcher,
    shutdown: ShutdownSignal,
    state: watch::Sender<ListenerState>,
}

impl Supervisor {
    pub fn new(
        config: ServiceConfig,
        dispatcher: Dispatcher,
        shutdown: ShutdownSignal,
        state: watch::Sender<ListenerState>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            shutdown,
            state,
        }
    }

    /// Bind the loopback sockets, retrying while the port is still held,
    /// then run the accept loop until shutdown. Only a bind failure escapes.
    pub async fn run(self) -> Result<(), ListenerError> {
        let Supervisor {
            config,
            dispatcher,
            shutdown,
            state,
        } = self;

        let policy = RetryPolicy::from(&config.bind);
        let targets = loopback_targets(config.port);
        let targets = targets.as_slice();
        let state_ref = &state;

        let bound = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                state.send_replace(ListenerState::Stopped);
                return Ok(());
            }
            bound = retry_transient(policy, move |attempt| {
                state_ref.send_replace(ListenerState::Starting { attempt });
                metrics::record_bind_attempt();
                Listener::bind(targets)
            }) => bound,
        };

        let listener = match bound {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(
                    port = config.port,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Report server failed to start"
                );
                state.send_replace(ListenerState::Faulted(e.to_string()));
                return Err(e);
            }
        };

        state.send_replace(ListenerState::Running {
            addrs: listener.local_addrs(),
        });

        let server = ReportHttpServer::new(&config, dispatcher);
        server.serve(listener, shutdown).await;

        state.send_replace(ListenerState::Stopped);
        Ok(())
    }
}
