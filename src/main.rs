mod terminal;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use chat_stream::transport::HttpTransport;
use chat_stream::{ChatService, ClientConfig};

use crate::terminal::ReplyPrinter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing; stdout belongs to the conversation
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_stream=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let config = ClientConfig::from_env()?;
    let transport = HttpTransport::new(&config)?;
    info!("Streaming replies from {}", transport.url());
    let service = ChatService::new(transport, config.decoder.clone());

    // ── Read-eval loop ────────────────────────────────────────────────────────
    let mut printer = ReplyPrinter::new(std::io::stdout());
    printer.prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            printer.prompt();
            continue;
        }

        let outcome = service
            .send_message(text, |snapshot| printer.render(snapshot))
            .await;
        if let Some(notice) = outcome.notice() {
            eprintln!("Error: {notice}");
        }
        printer.finish();
    }

    info!(messages = service.snapshot().messages.len(), "Session ended");
    Ok(())
}
