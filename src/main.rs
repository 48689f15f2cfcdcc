use std::io::Error;
use std::sync::Arc;

use poem::{Route, Server, listener::TcpListener};
use poem_openapi::OpenApiService;
use tokio::main;
use tracing::info;

use slidesms::{
    application::{
        dispatcher::RecipientDispatcher, services::queue::DeliveryQueue,
        usecases::send_bulk::SendBulkUseCase,
    },
    config::{Config, DispatchMode},
    domain::repositories::MessageStore,
    infrastructure::{
        provider,
        queue::jetstream::JetstreamQueue,
        repositories::{in_memory::InMemoryMessageStore, postgres::PostgresMessageStore},
    },
    presentation::http::endpoints::{
        root::{ApiState, Endpoints},
        send::SendEndpoints,
    },
};

#[main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::try_parse().map_err(Error::other)?;

    let provider = provider::from_credentials(config.twilio.as_ref());
    let dispatcher = Arc::new(RecipientDispatcher::new(provider));

    let store: Arc<dyn MessageStore> = match &config.database_url {
        Some(url) => Arc::new(
            PostgresMessageStore::connect(url)
                .await
                .map_err(Error::other)?,
        ),
        None => Arc::new(InMemoryMessageStore::new()),
    };

    let queue: Option<Arc<dyn DeliveryQueue>> = match (config.dispatch_mode, &config.queue) {
        (DispatchMode::Queue, Some(queue_config)) => Some(Arc::new(
            JetstreamQueue::connect(queue_config)
                .await
                .map_err(Error::other)?,
        )),
        (DispatchMode::Queue, None) => {
            return Err(Error::other("DISPATCH_MODE=queue requires QUEUE_URL"));
        }
        (DispatchMode::Inline, _) => None,
    };

    let send_usecase = Arc::new(SendBulkUseCase::new(
        dispatcher,
        store,
        queue,
        config.dispatch_mode,
    ));
    let state = Arc::new(ApiState { send_usecase });

    let server_url = format!("{}://{}:{}", config.scheme, config.host, config.port);
    info!(mock_mode = config.twilio.is_none(), "Starting server at {server_url}");

    let api_service = OpenApiService::new(
        (Endpoints, SendEndpoints::new(state)),
        "SlideSMS API",
        "0.1.0",
    )
    .server(format!("{server_url}/api"));
    let ui = api_service.swagger_ui();
    let app = Route::new().nest("/api", api_service).nest("/", ui);

    Server::new(TcpListener::bind(format!("{}:{}", config.host, config.port)))
        .run(app)
        .await
}
