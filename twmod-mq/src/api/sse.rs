//! Server-Sent Events broadcaster
//!
//! Each client first gets an `init` event with the full session snapshot,
//! then one `change` event per mutation.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};
use twmod_common::events::ModerationEvent;

use super::server::AppContext;

/// GET /events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (snapshot, rx) = ctx.engine.subscribe().await;
    debug!(
        "New SSE client connected ({} subscribers)",
        ctx.engine.events().subscriber_count()
    );

    let init = stream::iter(to_sse(&ModerationEvent::Init { snapshot }).map(Ok::<_, Infallible>));

    let changes = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => to_sse(&event).map(Ok::<_, Infallible>),
            Err(e) => {
                // Lagged receivers skip ahead; the next change carries full state
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(init.chain(changes)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_sse(event: &ModerationEvent) -> Option<Event> {
    match serde_json::to_string(event.snapshot()) {
        Ok(json) => Some(Event::default().event(event.event_type()).data(json)),
        Err(e) => {
            warn!("Failed to serialize event: {}", e);
            None
        }
    }
}
