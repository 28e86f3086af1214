use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use serde_json::Value;

use crate::config::CommonConfig;
use crate::display::display_json;
use crate::server::authn::token::factory::TokenFactory;
use crate::server::authn::token::TokenGenerator;
use crate::server::config::ServerConfig;

use super::{ConfigArgs, RunCommand};

/// Sign a token with the configured jwt key, for calling the API from scripts
/// or tests.
#[derive(Args)]
pub struct TokenArgs {
    /// The identity stored in the token. Numbers are kept as JSON numbers.
    #[arg(short, long)]
    pub user_id: String,

    /// Roles and permissions granted by the token, comma separated. For
    /// example: `ROLE_ADMIN,curd:write`.
    #[arg(short, long, value_delimiter = ',')]
    pub authorities: Vec<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl TokenArgs {
    fn user_id_value(&self) -> Value {
        match self.user_id.parse::<u64>() {
            Ok(id) => Value::from(id),
            Err(_) => Value::String(self.user_id.clone()),
        }
    }
}

#[async_trait]
impl RunCommand for TokenArgs {
    async fn run(&self) -> Result<()> {
        let ps = self.config.build_path_set()?;
        let cfg: ServerConfig = ps.load_config(ServerConfig::default)?;

        let factory = TokenFactory::new(&cfg.jwt).context("init token")?;
        let generator = factory.build_token_generator();

        let authorities = self
            .authorities
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let resp = generator
            .generate_token(self.user_id_value(), authorities)
            .context("generate token")?;
        display_json(resp)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::cmd::{App, Commands};

    use super::*;

    #[test]
    fn test_parse_args() {
        let app = App::try_parse_from([
            "curd",
            "token",
            "--user-id",
            "42",
            "--authorities",
            "ROLE_ADMIN,curd:write",
            "--env",
            "dev",
        ])
        .unwrap();
        let Commands::Token(args) = app.command else {
            panic!("expect token command");
        };
        assert_eq!(args.user_id_value(), Value::from(42u64));
        assert_eq!(args.authorities, vec!["ROLE_ADMIN", "curd:write"]);
        assert_eq!(args.config.env.as_deref(), Some("dev"));

        let app = App::try_parse_from(["curd", "token", "-u", "alice"]).unwrap();
        let Commands::Token(args) = app.command else {
            panic!("expect token command");
        };
        assert_eq!(args.user_id_value(), Value::from("alice"));
        assert!(args.authorities.is_empty());
    }
}
