mod config;
mod serve;
mod token;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};

use crate::config::PathSet;
use crate::server::restful::RestfulServer;

#[async_trait]
pub trait RunCommand {
    async fn run(&self) -> Result<()>;
}

/// A command that ends in a long running server. The actix server is not
/// `Send`, so it is built here and run by the caller instead of inside an
/// async trait method.
pub trait ServerCommand {
    fn build_server(&self) -> Result<RestfulServer>;
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// The config directory. Default: `$CURD_CONFIG`, then `/etc/curd` for root,
    /// otherwise `~/.config/curd`.
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// The data directory. Default: `$CURD_DATA`, then `/var/lib/curd` for root,
    /// otherwise `~/.local/share/curd`.
    #[arg(long)]
    pub data_path: Option<PathBuf>,

    /// The environment, selects `app-<env>.toml`. Default: `$ENVIRONMENT`,
    /// then `$ENV`, then `prod`.
    #[arg(short, long)]
    pub env: Option<String>,
}

impl ConfigArgs {
    pub fn build_path_set(&self) -> Result<PathSet> {
        PathSet::new(
            self.config_path.clone(),
            self.data_path.clone(),
            self.env.clone(),
        )
    }
}

#[derive(Parser)]
#[command(author, about, version = env!("CURD_VERSION"))]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Config(config::ShowConfigArgs),
    Serve(serve::ServeArgs),
    Token(token::TokenArgs),
}

impl App {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Config(args) => args.run().await,
            Commands::Serve(args) => {
                let srv = args.build_server()?;
                srv.run().await
            }
            Commands::Token(args) => args.run().await,
        }
    }
}
