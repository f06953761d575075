//! Event loop that owns a [`RouteSession`] and talks to the backend.
//!
//! Intents arrive from any number of [`SessionHandle`]s. Each request the
//! session emits runs in its own task; its completion comes back through
//! a channel and is applied on the loop like any other event. Only the
//! loop touches the session, and the view is republished after every
//! event.

use std::sync::Arc;

use planner_core::{
    AircraftType, Completion, IntentError, Location, Request, RouteSession, SessionConfig,
    SessionView,
};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::backend::RouterBackend;

const INTENT_QUEUE: usize = 64;

/// Something the user did.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    PickAircraft(AircraftType),
    ClickNode(String),
    RequestNearbyNodes {
        center: Location,
        radius: f64,
        capacity: u32,
    },
    RequestRoute,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Intent(#[from] IntentError),

    #[error("session runner has stopped")]
    Closed,
}

struct Envelope {
    intent: Intent,
    reply: oneshot::Sender<Result<(), IntentError>>,
}

/// Cloneable front door to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    intents: mpsc::Sender<Envelope>,
    view: watch::Receiver<SessionView>,
}

impl SessionHandle {
    /// Send an intent and wait until it has been applied. The view read
    /// afterwards already reflects it.
    pub async fn send(&self, intent: Intent) -> Result<(), SessionError> {
        let (reply, applied) = oneshot::channel();
        self.intents
            .send(Envelope { intent, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        applied.await.map_err(|_| SessionError::Closed)??;
        Ok(())
    }

    pub async fn pick_aircraft(&self, aircraft: AircraftType) -> Result<(), SessionError> {
        self.send(Intent::PickAircraft(aircraft)).await
    }

    pub async fn click_node(&self, uid: impl Into<String>) -> Result<(), SessionError> {
        self.send(Intent::ClickNode(uid.into())).await
    }

    pub async fn request_nearby_nodes(
        &self,
        center: Location,
        radius: f64,
        capacity: u32,
    ) -> Result<(), SessionError> {
        self.send(Intent::RequestNearbyNodes {
            center,
            radius,
            capacity,
        })
        .await
    }

    pub async fn request_route(&self) -> Result<(), SessionError> {
        self.send(Intent::RequestRoute).await
    }

    /// Current snapshot.
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    /// Wait until the view satisfies `ready`.
    pub async fn wait_for(
        &self,
        ready: impl FnMut(&SessionView) -> bool,
    ) -> Result<SessionView, SessionError> {
        let mut view = self.view.clone();
        let current = view.wait_for(ready).await.map_err(|_| SessionError::Closed)?;
        Ok(SessionView::clone(&current))
    }
}

pub struct SessionRunner<B> {
    session: RouteSession,
    backend: Arc<B>,
    intents: mpsc::Receiver<Envelope>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    view: watch::Sender<SessionView>,
}

impl<B: RouterBackend> SessionRunner<B> {
    pub fn new(backend: Arc<B>, config: SessionConfig) -> (Self, SessionHandle) {
        let session = RouteSession::new(config);
        let (intents_tx, intents) = mpsc::channel(INTENT_QUEUE);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (view, view_rx) = watch::channel(session.view());

        let runner = Self {
            session,
            backend,
            intents,
            completions_tx,
            completions_rx,
            view,
        };
        let handle = SessionHandle {
            intents: intents_tx,
            view: view_rx,
        };
        (runner, handle)
    }

    /// Run until every handle has been dropped.
    pub async fn run(mut self) {
        tracing::info!("Session runner started");
        loop {
            tokio::select! {
                envelope = self.intents.recv() => {
                    let Some(Envelope { intent, reply }) = envelope else {
                        break;
                    };
                    let result = self.apply_intent(intent);
                    self.publish();
                    let _ = reply.send(result);
                }
                Some(completion) = self.completions_rx.recv() => {
                    match self.session.complete(completion) {
                        Ok(requests) => self.dispatch(requests),
                        Err(e) => tracing::debug!("Completion ignored: {}", e),
                    }
                    self.publish();
                }
            }
        }
        tracing::info!("Session runner shutting down");
    }

    fn apply_intent(&mut self, intent: Intent) -> Result<(), IntentError> {
        tracing::debug!(?intent, "Applying intent");
        let requests = match intent {
            Intent::PickAircraft(aircraft) => self.session.pick_aircraft(aircraft),
            Intent::ClickNode(uid) => self.session.click_node(&uid)?,
            Intent::RequestNearbyNodes {
                center,
                radius,
                capacity,
            } => self
                .session
                .request_nearby_nodes(center, radius, capacity)?,
            Intent::RequestRoute => self.session.request_route(),
        };
        self.dispatch(requests);
        Ok(())
    }

    fn dispatch(&self, requests: Vec<Request>) {
        for request in requests {
            tracing::debug!(
                kind = request.kind(),
                ticket = request.ticket().0,
                "Dispatching request"
            );
            let backend = Arc::clone(&self.backend);
            let completions = self.completions_tx.clone();
            tokio::spawn(async move {
                let completion = execute(backend.as_ref(), request).await;
                // Receiver only goes away when the runner stops.
                let _ = completions.send(completion);
            });
        }
    }

    fn publish(&self) {
        self.view.send_replace(self.session.view());
    }
}

async fn execute<B: RouterBackend>(backend: &B, request: Request) -> Completion {
    match request {
        Request::InitializeRouter { ticket, aircraft } => Completion::RouterInitialized {
            ticket,
            aircraft,
            result: backend.initialize_router(aircraft).await,
        },
        Request::FetchEdges { ticket, aircraft } => Completion::EdgesFetched {
            ticket,
            aircraft,
            result: backend.get_edges(aircraft).await,
        },
        Request::FetchNearbyNodes { ticket, query } => Completion::NearbyNodesFetched {
            ticket,
            result: backend.get_nearby_nodes(&query).await,
        },
        Request::FetchRoute { ticket, query } => Completion::RouteFetched {
            ticket,
            result: backend.get_route(&query).await,
        },
    }
}

/// Start a runner on the current tokio runtime.
pub fn spawn_session<B: RouterBackend>(
    backend: B,
    config: SessionConfig,
) -> (SessionHandle, JoinHandle<()>) {
    let (runner, handle) = SessionRunner::new(Arc::new(backend), config);
    let task = tokio::spawn(runner.run());
    (handle, task)
}
