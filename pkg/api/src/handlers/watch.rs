use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use pkg_constants::state::REGISTRY_PREFIX;
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WatchQuery {
    /// Resource plural to follow, e.g. `shoots`. All kinds when absent.
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub seq: Option<u64>,
}

/// GET /apis/garden.sapcloud.io/v1beta1/watch: SSE stream of store events.
pub async fn watch_events(
    State(state): State<AppState>,
    Query(query): Query<WatchQuery>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let prefix = match &query.resource {
        Some(resource) => format!("{}{}/", REGISTRY_PREFIX, resource),
        None => REGISTRY_PREFIX.to_string(),
    };
    let from_seq = query.seq.unwrap_or(0);
    info!("Watch subscription: prefix='{}', from_seq={}", prefix, from_seq);

    // Subscribe before replaying so nothing falls between the two.
    let rx = state.store.event_log.subscribe();
    let buffered = state.store.event_log.events_since(from_seq, &prefix).await;
    let last_replayed = buffered.last().map(|e| e.seq).unwrap_or(from_seq);

    let replay = tokio_stream::iter(buffered.into_iter().filter_map(|e| {
        serde_json::to_string(&e)
            .ok()
            .map(|data| Ok::<_, Infallible>(Event::default().data(data)))
    }));

    let live = BroadcastStream::new(rx).filter_map(move |result| {
        let event = result.ok()?;
        if event.seq <= last_replayed || !event.key.starts_with(&prefix) {
            return None;
        }
        let data = serde_json::to_string(&event).ok()?;
        Some(Ok::<_, Infallible>(Event::default().data(data)))
    });

    Sse::new(replay.chain(live)).keep_alive(KeepAlive::default())
}
