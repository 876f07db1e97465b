pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "inticky")]
#[command(about = "Inticky CLI - development tokens and tenant context checks")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint an HS256 token carrying tenant, user and roles")]
    Token(commands::token::TokenArgs),

    #[command(about = "Ask a running service which tenant context it resolves")]
    Whoami(commands::whoami::WhoamiArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Whoami(args) => commands::whoami::handle(args, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_command() {
        let cli = Cli::try_parse_from([
            "inticky", "--json", "token", "--tenant", "acme", "--user", "u1", "--roles", "ADMIN,AGENT",
        ])
        .unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Commands::Token(args) => {
                assert_eq!(args.tenant, "acme");
                assert_eq!(args.roles.as_deref(), Some("ADMIN,AGENT"));
                assert_eq!(args.email, None);
            }
            Commands::Whoami(_) => panic!("expected token command"),
        }
    }

    #[test]
    fn whoami_defaults_to_local_service() {
        let cli = Cli::try_parse_from(["inticky", "whoami", "--token", "abc"]).unwrap();
        match cli.command {
            Commands::Whoami(args) => {
                assert_eq!(args.url, "http://localhost:8080");
                assert_eq!(args.tenant, None);
            }
            Commands::Token(_) => panic!("expected whoami command"),
        }
    }
}
