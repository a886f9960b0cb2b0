//! The worker loop: one request at a time, responses pushed onto an unbounded channel.

use crate::messages::{WorkerRequest, WorkerResponse};
use crate::router::Router;
use canopy_layout::LayoutEngine;
use futures::StreamExt;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

/// Controller side of a worker.
#[derive(Debug)]
pub struct WorkerHandle {
    pub requests: UnboundedSender<WorkerRequest>,
    pub responses: UnboundedReceiver<WorkerResponse>,
}

/// Creates the channels for `router` and returns the worker future that serves them.
///
/// The future is executor-agnostic; it completes once every request sender is dropped and the
/// queued requests have been handled.
pub fn spawn_worker<L: LayoutEngine>(
    router: Router<L>,
) -> (WorkerHandle, impl Future<Output = Router<L>>) {
    let (request_tx, request_rx) = unbounded();
    let (response_tx, response_rx) = unbounded();
    let handle = WorkerHandle {
        requests: request_tx,
        responses: response_rx,
    };
    (handle, run_worker(router, request_rx, response_tx))
}

/// Serves `requests` until the channel closes, then hands the router back.
pub async fn run_worker<L: LayoutEngine>(
    mut router: Router<L>,
    mut requests: UnboundedReceiver<WorkerRequest>,
    responses: UnboundedSender<WorkerResponse>,
) -> Router<L> {
    while let Some(request) = requests.next().await {
        let span = tracing::info_span!("request", event_type = request.event_type());
        let _enter = span.enter();

        let result = router.handle(request, |response| {
            if responses.unbounded_send(response).is_err() {
                tracing::trace!("response receiver dropped");
            }
        });
        if let Err(err) = result {
            tracing::warn!(error = %err, "request rejected");
        }
    }
    tracing::debug!(cached = router.store().len(), "request channel closed");
    router
}
