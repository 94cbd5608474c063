//! GraphQL schema definition.

use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use juniper::{FieldError, FieldResult, RootNode};
use tracing::info;

use super::context::GraphQLContext;
use crate::domains::announcements;
use crate::domains::users::UserData;

pub struct Query;

#[juniper::graphql_object(context = GraphQLContext)]
impl Query {
    /// The user this request is authenticated as, or null
    fn me(ctx: &GraphQLContext) -> Option<UserData> {
        ctx.user.as_ref().map(UserData::from)
    }

    /// Current server time
    fn server_time() -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct Mutation;

#[juniper::graphql_object(context = GraphQLContext)]
impl Mutation {
    /// Broadcast an announcement to every live `announcementSent` subscriber
    ///
    /// The payload is delivered exactly as given, blank strings included.
    async fn announce(ctx: &GraphQLContext, announcement: String) -> FieldResult<String> {
        info!(
            user_id = ?ctx.user.as_ref().map(|u| u.id),
            "Publishing announcement"
        );
        announcements::announce(&ctx.stream_hub, &announcement).await;

        Ok("Sent!".to_string())
    }
}

type AnnouncementStream = Pin<Box<dyn Stream<Item = Result<String, FieldError>> + Send>>;

pub struct Subscription;

#[juniper::graphql_subscription(context = GraphQLContext)]
impl Subscription {
    /// Announcements published after the subscription starts
    async fn announcement_sent(ctx: &GraphQLContext) -> AnnouncementStream {
        let stream = announcements::subscribe(&ctx.stream_hub, ctx.user.clone()).await;
        Box::pin(stream.map(Ok))
    }
}

pub type Schema = RootNode<'static, Query, Mutation, Subscription>;

pub fn create_schema() -> Schema {
    Schema::new(Query, Mutation, Subscription)
}
