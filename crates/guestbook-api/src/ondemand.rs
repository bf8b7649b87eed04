//! Request-triggered lifecycle: the router is built on the first request and
//! every later request in the same process reuses it.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::{OnceCell, watch};
use tower::ServiceExt;
use tracing::{error, info, warn};

use crate::config::Config;

/// How long in-flight requests get to finish after shutdown is requested.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// A router that is initialized at most once. Concurrent callers that arrive
/// before initialization finishes wait on the same attempt. A failed attempt
/// leaves the cell empty so the next request tries again.
pub struct CachedApp {
    cell: OnceCell<Router>,
}

impl CachedApp {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get_or_init<F, Fut>(&self, init: F) -> anyhow::Result<&Router>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Router>>,
    {
        self.cell.get_or_try_init(init).await
    }

    pub async fn handle<F, Fut>(&self, req: Request, init: F) -> Response
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Router>>,
    {
        let app = match self.get_or_init(init).await {
            Ok(app) => app.clone(),
            Err(e) => {
                error!("Failed to initialize guestbook app: {:#}", e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        match app.oneshot(req).await {
            Ok(res) => res,
            Err(never) => match never {},
        }
    }
}

impl Default for CachedApp {
    fn default() -> Self {
        Self::new()
    }
}

static APP: CachedApp = CachedApp::new();

/// The process-wide cached app used by the server binary.
pub fn global() -> &'static CachedApp {
    &APP
}

/// Builds the app from environment configuration.
pub async fn init_from_env() -> anyhow::Result<Router> {
    let config = Config::from_env()?;
    let app = tokio::task::spawn_blocking(move || crate::build_app(&config)).await??;
    info!("Guestbook app initialized");
    Ok(app)
}

/// Accepts connections on `listener` and routes every request through `app`,
/// building it with `init` on first use. When `shutdown` resolves, accepting
/// stops, every open connection is told to close once its current request
/// is answered (idle keep-alive connections close at once), and connections
/// still open after [`DRAIN_TIMEOUT`] are aborted.
pub async fn serve<F, Fut>(
    listener: TcpListener,
    app: &'static CachedApp,
    init: F,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Router>> + Send + 'static,
{
    let init = Arc::new(init);
    let (closing_tx, closing_rx) = watch::channel(false);
    let mut tasks = tokio::task::JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                info!(in_flight = tasks.len(), "Draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let init = Arc::clone(&init);
                let mut closing = closing_rx.clone();

                tasks.spawn(async move {
                    let svc = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                        let init = Arc::clone(&init);
                        async move {
                            Ok::<_, Infallible>(app.handle(req.map(Body::new), move || (*init)()).await)
                        }
                    });

                    let builder = ConnBuilder::new(TokioExecutor::new());
                    let conn = builder.serve_connection(TokioIo::new(stream), svc);
                    tokio::pin!(conn);

                    let res = tokio::select! {
                        res = conn.as_mut() => res,
                        _ = closing.changed() => {
                            conn.as_mut().graceful_shutdown();
                            conn.as_mut().await
                        }
                    };
                    if let Err(e) = res {
                        error!(peer = %peer, "connection error: {e}");
                    }
                });
            }

            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);
    let _ = closing_tx.send(true);

    let drain = async { while tasks.join_next().await.is_some() {} };
    if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
        warn!(remaining = tasks.len(), "Drain timed out, aborting connections");
        tasks.shutdown().await;
    }

    info!("Guestbook on-demand handler stopped");
    Ok(())
}
