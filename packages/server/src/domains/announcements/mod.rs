//! Announcements domain - broadcast text messages to live subscribers
//!
//! Announcements are never stored; they exist only on the `announcementSent`
//! topic of the stream hub.

use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use crate::domains::users::User;
use crate::kernel::StreamHub;

/// Stream hub topic for announcements
pub const ANNOUNCEMENT_SENT: &str = "announcementSent";

/// Publish an announcement to everyone currently subscribed.
pub async fn announce(hub: &StreamHub, announcement: &str) {
    hub.publish(ANNOUNCEMENT_SENT, serde_json::Value::String(announcement.to_string()))
        .await;
}

/// Per-subscription delivery predicate.
///
/// Receives the payload and the identity resolved when the subscriber
/// connected; every announcement is currently delivered to everyone.
pub fn announcement_filter(_announcement: &str, _subscriber: Option<&User>) -> bool {
    true
}

/// Subscribe to announcements published from now on
///
/// Events are yielded in publish order. A subscriber that lags behind the
/// channel capacity skips the missed announcements.
pub async fn subscribe(
    hub: &StreamHub,
    subscriber: Option<User>,
) -> impl Stream<Item = String> + Send + 'static {
    let rx = hub.subscribe(ANNOUNCEMENT_SENT).await;

    BroadcastStream::new(rx).filter_map(move |result| {
        let delivered = match result {
            Ok(serde_json::Value::String(announcement))
                if announcement_filter(&announcement, subscriber.as_ref()) =>
            {
                Some(announcement)
            }
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                warn!(missed, "Announcement subscriber lagged");
                None
            }
        };
        async move { delivered }
    })
}
