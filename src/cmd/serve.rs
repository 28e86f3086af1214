use anyhow::{Context, Result};
use clap::Args;
use log::info;

use crate::config::CommonConfig;
use crate::server::config::ServerConfig;
use crate::server::factory::ServerFactory;
use crate::server::restful::RestfulServer;

use super::{ConfigArgs, ServerCommand};

/// Start the curd HTTP/HTTPS server.
#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl ServerCommand for ServeArgs {
    fn build_server(&self) -> Result<RestfulServer> {
        let ps = self.config.build_path_set()?;
        let cfg: ServerConfig = ps.load_config(ServerConfig::default)?;
        cfg.log.init()?;
        info!(
            "Starting curd {} with env '{}', config path {}",
            env!("CURD_VERSION"),
            ps.env,
            ps.config_path.display()
        );

        let factory = ServerFactory::new(cfg)?;
        factory.build_server().context("build server")
    }
}
