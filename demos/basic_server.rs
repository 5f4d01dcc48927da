use axum::{error_handling::HandleErrorLayer, extract::Path, routing::get};
use global_exception_handler::prelude::*;
use global_exception_handler::HandlerSettings;
use serde::Serialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

#[derive(Debug, thiserror::Error)]
#[error("Record {0} could not be found")]
struct RecordNotFoundException(u32);

#[derive(Debug, thiserror::Error)]
#[error("Validation failed: {0}")]
struct ValidationException(String);

#[derive(Debug, thiserror::Error)]
#[error("Field {0} is required")]
struct MissingFieldException(&'static str);

#[derive(Serialize)]
struct Product {
    id: u32,
    name: &'static str,
}

async fn find_product(Path(id): Path<u32>) -> Result<Json<Product>, Thrown> {
    match id {
        1 => Ok(Json(Product {
            id,
            name: "Keyboard",
        })),
        0 => Err(MissingFieldException("id").into()),
        _ => Err(RecordNotFoundException(id).into()),
    }
}

async fn validate() -> Result<&'static str, Thrown> {
    Err(ValidationException("name must not be empty".into()).into())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let settings = HandlerSettings::from_env()?;

    let mut config = ExceptionHandlerConfiguration::new();
    config
        .with_settings(settings)
        .formatter(PlainTextFormatter::default())
        .extends::<MissingFieldException, ValidationException>()
        .on_error(TracingObserver)
        .use_default_message_formatter(default_message_formatter());

    config
        .map::<RecordNotFoundException>()
        .to_status_code(StatusCode::NOT_FOUND)
        .with_body(json!({ "message": "An exception occured" }));
    config
        .map::<ValidationException>()
        .to_status_code(StatusCode::BAD_REQUEST)
        .with_body_fn(|e| json!({ "message": e.to_string() }));
    config
        .map::<MissingFieldException>()
        .to_status_code(StatusCode::UNPROCESSABLE_ENTITY)
        .with_body_writer(|e, response, handler| {
            response.write_serialized(&json!({
                "message": e.to_string(),
                "requestId": handler.request_id(),
            }))?;
            Ok(())
        });

    let app = Router::new()
        .route("/products/{id}", get(find_product))
        .route("/validate", get(validate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(|err: BoxError| async move {
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }))
                .layer(config.layer()),
        );

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
