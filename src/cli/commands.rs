use clap::{Parser, Subcommand};

use crate::auth::DEFAULT_TOKEN_TTL_SECS;

#[derive(Parser)]
#[command(name = "chat-relay")]
#[command(author, version, about = "Authenticated chat relay to a hosted LLM", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Mint a bearer token for a user id
    Token {
        user_id: String,

        /// Token lifetime in seconds
        #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_SECS)]
        ttl_secs: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_bind() {
        let cli = Cli::try_parse_from(["chat-relay", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind.as_deref(), Some("0.0.0.0:8080")),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_token_defaults() {
        let cli = Cli::try_parse_from(["chat-relay", "token", "user-1"]).unwrap();
        match cli.command {
            Commands::Token { user_id, ttl_secs } => {
                assert_eq!(user_id, "user-1");
                assert_eq!(ttl_secs, DEFAULT_TOKEN_TTL_SECS);
            }
            _ => panic!("expected token"),
        }
    }
}
