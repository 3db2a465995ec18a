use anyhow::Result;
use chat_relay::auth::JwtAuth;
use chat_relay::cli::{Cli, Commands};
use chat_relay::{init_tracing, server, utils, AppState, Settings};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::new()?;
    init_tracing(&settings.logging.level);

    match cli.command {
        Commands::Serve { bind } => handle_serve(settings, bind).await,
        Commands::Token { user_id, ttl_secs } => handle_token(&settings, &user_id, ttl_secs),
    }
}

async fn handle_serve(settings: Settings, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| settings.server.bind.clone());

    utils::print_header("chat-relay");
    utils::print_info(&format!("Model: {} ({})", settings.llm.model, settings.llm.base_url));
    utils::print_info(&format!("Listening on http://{}", bind));
    utils::print_info("Press Ctrl+C to stop\n");

    let state = AppState::from_settings(&settings).await?;
    server::serve(state, &bind).await?;

    utils::print_success("Server stopped");
    Ok(())
}

fn handle_token(settings: &Settings, user_id: &str, ttl_secs: i64) -> Result<()> {
    let secret = settings.jwt_secret()?;
    let token = JwtAuth::new(secret.as_bytes()).issue(user_id, ttl_secs)?;
    println!("{}", token);
    Ok(())
}
