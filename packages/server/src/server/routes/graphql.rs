use crate::server::error::AppError;
use crate::server::graphql::{GraphQLContext, Schema};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use juniper::http::GraphQLRequest;
use std::sync::Arc;
use tracing::warn;

/// GraphQL POST endpoint
///
/// Resolver errors come back inside the response's `errors` array with 200;
/// documents that fail to parse or validate get 400.
pub async fn graphql_handler(
    State(schema): State<Arc<Schema>>,
    Extension(context): Extension<GraphQLContext>,
    Json(request): Json<GraphQLRequest>,
) -> Response {
    let response = request.execute(&*schema, &context).await;
    let status = if response.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    let body = match serde_json::to_value(&response) {
        Ok(body) => body,
        Err(e) => return AppError::Internal(e.into()).into_response(),
    };

    if let Some(errors) = body.get("errors") {
        warn!(%errors, "GraphQL operation returned errors");
    }

    (status, Json(body)).into_response()
}

/// GraphQL playground (GraphiQL), development only
pub async fn graphql_playground() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html>
<head>
    <title>GraphQL Playground</title>
    <style>
        body {
            height: 100%;
            margin: 0;
            width: 100%;
            overflow: hidden;
        }
        #graphiql {
            height: 100vh;
        }
    </style>
    <script
        crossorigin
        src="https://unpkg.com/react@18/umd/react.production.min.js"
    ></script>
    <script
        crossorigin
        src="https://unpkg.com/react-dom@18/umd/react-dom.production.min.js"
    ></script>
    <link rel="stylesheet" href="https://unpkg.com/graphiql/graphiql.min.css" />
</head>
<body>
    <div id="graphiql">Loading...</div>
    <script
        src="https://unpkg.com/graphiql/graphiql.min.js"
        type="application/javascript"
    ></script>
    <script>
        const scheme = window.location.protocol === 'https:' ? 'wss' : 'ws';
        const fetcher = GraphiQL.createFetcher({
            url: '/api/graphql',
            subscriptionUrl: `${scheme}://${window.location.host}/api/subscriptions`,
        });

        ReactDOM.render(
            React.createElement(GraphiQL, { fetcher: fetcher }),
            document.getElementById('graphiql'),
        );
    </script>
</body>
</html>
"#,
    )
}
