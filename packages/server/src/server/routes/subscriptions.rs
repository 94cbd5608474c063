//! GraphQL subscriptions over WebSocket.
//!
//! GET /api/subscriptions
//!
//! The upgrade request passes through the session layer and the auth gateway
//! like any other request, so the connection's context carries the identity
//! resolved at connect time. It is not re-checked per event.

use std::{future::Future, pin::Pin, sync::Arc};

use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        Extension, State,
    },
    response::Response,
};
use juniper_axum::subscriptions;
use juniper_graphql_ws::ConnectionConfig;
use tracing::debug;

use crate::server::graphql::{GraphQLContext, Schema};

/// Sub-protocol of current `graphql-ws` clients
const TRANSPORT_PROTOCOL: &str = "graphql-transport-ws";
/// Sub-protocol of the legacy `subscriptions-transport-ws` clients
const LEGACY_PROTOCOL: &str = "graphql-ws";

pub async fn subscriptions_handler(
    State(schema): State<Arc<Schema>>,
    Extension(context): Extension<GraphQLContext>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.protocols([TRANSPORT_PROTOCOL, LEGACY_PROTOCOL])
        .on_upgrade(move |socket| serve(socket, schema, context))
}

/// Run one subscription connection with a fixed context
async fn serve(socket: WebSocket, schema: Arc<Schema>, context: GraphQLContext) {
    debug!(
        user_id = ?context.user.as_ref().map(|u| u.id),
        "Subscription connection opened"
    );

    // Picks graphql-ws or graphql-transport-ws from the negotiated protocol
    // Boxed as `dyn Future + Send` so rustc checks `Send` at the concrete
    // `'static` schema lifetime instead of an inferred higher-ranked one
    let fut: Pin<Box<dyn Future<Output = ()> + Send>> = Box::pin(subscriptions::serve_ws(
        socket,
        schema,
        ConnectionConfig::new(context),
    ));
    fut.await;

    debug!("Subscription connection closed");
}
