//! In-memory stand-in for the books/roles REST service.
//!
//! The server runs on its own thread and current-thread runtime so both sync
//! and async tests can drive it. Dropping the handle shuts it down.

use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

pub mod error;
pub mod handlers;
pub mod router;
pub mod store;

use router::RouterBuilder;
pub use store::{Faults, Store};

/// Handle for a running fake service
pub struct FakeServiceHandle {
    base_url: String,
    store: Arc<Store>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl FakeServiceHandle {
    /// Root URL; collections live at `{base_url}/books/` and `{base_url}/roles/`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Records created and not yet deleted
    pub fn live_records(&self) -> usize {
        self.store.live_count()
    }
}

impl Drop for FakeServiceHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawn a well-behaved fake service on an ephemeral port
pub fn spawn() -> anyhow::Result<FakeServiceHandle> {
    spawn_with_faults(Faults::default())
}

/// Spawn a fake service that breaks the contract as described by `faults`
pub fn spawn_with_faults(faults: Faults) -> anyhow::Result<FakeServiceHandle> {
    let listener = StdTcpListener::bind("127.0.0.1:0").context("fake service bind failed")?;
    listener
        .set_nonblocking(true)
        .context("fake service listener nonblocking failed")?;
    let addr = listener
        .local_addr()
        .context("fake service local addr failed")?;
    let base_url = format!("http://{addr}");

    let store = Arc::new(Store::new(faults));
    let app = RouterBuilder::new()
        .with_collections(Arc::clone(&store))
        .with_tracing()
        .build();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let join = thread::Builder::new()
        .name("pulse-fake-service".to_string())
        .spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(error) => {
                    tracing::error!(%error, "fake service runtime failed to start");
                    return;
                }
            };
            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(listener) => listener,
                    Err(error) => {
                        tracing::error!(%error, "fake service listener failed");
                        return;
                    }
                };
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });
                if let Err(error) = server.await {
                    tracing::error!(%error, "fake service stopped with error");
                }
            });
        })
        .context("fake service thread spawn failed")?;

    tracing::debug!(%base_url, ?faults, "fake service listening");

    Ok(FakeServiceHandle {
        base_url,
        store,
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}
