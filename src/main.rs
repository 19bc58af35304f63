use std::sync::Arc;

use courier::config::Config;
use courier::generate::{EmailDrafter, GroqDrafter};
use courier::server::rpc_routes;
use courier::tools::{ToolDeps, build_registry};
use courier::transport::email::EmailApi;
use courier::transport::sms::SmsApi;
use courier::transport::smtp::SmtpMailer;
use courier::transport::whatsapp::WhatsAppApi;
use courier::transport::{ApiTransport, HttpTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    let configured = |ok: bool| if ok { "configured" } else { "not configured" };
    eprintln!("🚀 Courier v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   📧 Messaging API: {} ({})",
        config.brevo.base_url,
        configured(config.brevo.has_key())
    );
    eprintln!(
        "   ✉️  SMTP relay: {}:{} ({})",
        config.smtp.server,
        config.smtp.port,
        configured(config.smtp.has_credentials())
    );
    eprintln!(
        "   🤖 Drafting: {} ({})",
        config.groq.model,
        configured(config.groq.has_key())
    );
    eprintln!(
        "   🔗 Server URL: http://{}:{}{}\n",
        config.server.host, config.server.port, config.server.path
    );

    // One shared transport for every REST channel.
    let transport: Arc<dyn ApiTransport> =
        Arc::new(HttpTransport::new(config.brevo.base_url.clone()));

    let deps = ToolDeps {
        email: Arc::new(EmailApi::new(config.brevo.clone(), Arc::clone(&transport))),
        sms: Arc::new(SmsApi::new(config.brevo.clone(), Arc::clone(&transport))),
        whatsapp: Arc::new(WhatsAppApi::new(config.brevo.clone(), Arc::clone(&transport))),
        mailer: Arc::new(SmtpMailer::new(config.smtp.clone())),
        drafter: Arc::new(GroqDrafter::new(config.groq.clone())) as Arc<dyn EmailDrafter>,
    };

    let registry = Arc::new(build_registry(deps));
    tracing::info!(tools = registry.count(), "Tool registry ready");

    let app = rpc_routes(registry, &config.server.path);
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        path = %config.server.path,
        "Tool server started"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
