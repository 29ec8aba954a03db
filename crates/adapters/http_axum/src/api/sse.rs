//! Server-Sent Events (SSE) stream of characteristic changes.

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::Deserialize;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use habridge_app::event_bus::ChangeFilter;
use habridge_app::ports::{AccessoryHost, RemoteStateService};
use habridge_domain::characteristic::CharacteristicKind;

use crate::error::ApiError;
use crate::state::AppState;

/// Optional narrowing of the stream.
#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    pub accessory: Option<String>,
    pub characteristic: Option<String>,
}

impl StreamQuery {
    fn into_filter(self) -> Result<ChangeFilter, ApiError> {
        let characteristic = self
            .characteristic
            .as_deref()
            .map(str::parse::<CharacteristicKind>)
            .transpose()?;
        Ok(ChangeFilter {
            accessory: self.accessory,
            characteristic,
        })
    }
}

/// `GET /api/events/stream`: changes pushed to the host, as JSON `data:`
/// frames named `characteristic_changed`. `?accessory=` and
/// `?characteristic=` restrict the stream.
pub async fn stream<R, H>(
    State(state): State<AppState<R, H>>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>, ApiError>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    let filter = query.into_filter()?;
    let event_rx = state.event_bus.subscribe();
    let event_stream = BroadcastStream::new(event_rx).filter_map(move |result| match result {
        Ok(change) if !filter.matches(&change) => None,
        Ok(change) => match serde_json::to_string(&change) {
            Ok(json) => Some(Ok(Event::default().event("characteristic_changed").data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize change for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, some changes were dropped");
            None
        }
    });

    Ok(Sse::new(event_stream).keep_alive(KeepAlive::default()))
}
