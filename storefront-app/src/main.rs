//! # Storefront Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the document store and payment gateway adapters
//! - Create the storefront service
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_hex::{StoreService, inbound::HttpServer};
use storefront_repo::{build_repo, redact};
use stripe_gateway::{Gateway, SandboxGateway, StripeGateway};

use config::{Config, PaymentBackend};

fn init_tracer(endpoint: &str) -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("storefront-service"), provider))
}

fn build_gateway(backend: &PaymentBackend) -> anyhow::Result<Gateway> {
    Ok(match backend {
        PaymentBackend::Stripe {
            secret_key,
            api_base,
        } => Gateway::Stripe(StripeGateway::with_api_base(secret_key, api_base)?),
        PaymentBackend::Sandbox => Gateway::Sandbox(SandboxGateway::new()),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // Export spans only when a collector is configured
    let otel = config
        .otlp_endpoint
        .as_deref()
        .map(init_tracer)
        .transpose()?;
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_app=debug,storefront_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting storefront server on port {}", config.port);
    tracing::info!(
        "Using database: {} ({})",
        redact(&config.database_url),
        config.database_name
    );

    // Build repository (handles connection and schema)
    let repo = build_repo(&config.database_url, &config.database_name).await?;
    let payments = build_gateway(&config.payments)?;
    tracing::info!(
        store = repo.backend(),
        payments = payments.backend(),
        "Adapters ready"
    );
    if matches!(payments, Gateway::Sandbox(_)) {
        tracing::warn!("Sandbox payment backend in use, no card is charged");
    }

    let service = StoreService::new(repo, payments);

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
