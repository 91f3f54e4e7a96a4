//! `voicecheck serve`: the detection HTTP service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info, warn};
use voicecheck_detect::{Engine, load_pretrained};

use crate::Cli;
use crate::config::{self, ServerConfig};
use crate::server::{self, AppState};

/// Run the detection HTTP service.
#[derive(Args)]
pub struct ServeCommand {
    /// Config file (YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address (e.g. :8001); overrides the config file
    #[arg(short, long)]
    listen: Option<String>,

    /// Accepted API key (repeatable); merged with keys from the config file
    #[arg(long = "api-key", env = "VOICECHECK_API_KEYS", value_delimiter = ',')]
    api_keys: Vec<String>,
}

impl ServeCommand {
    pub async fn run(&self, _cli: &Cli) -> Result<()> {
        let cfg = self.resolve_config()?;
        debug!(
            listen = %cfg.listen,
            keys = cfg.api_keys.len(),
            languages = ?cfg.languages,
            strategy = ?cfg.engine.strategy,
            "resolved configuration"
        );

        let mut engine = Engine::new(&cfg.engine).context("create detection engine")?;
        if let Some(model_cfg) = &cfg.engine.model {
            match load_pretrained(model_cfg) {
                Ok(model) => {
                    info!("using pretrained classifier {}", model.name());
                    engine = engine.with_model(model);
                }
                Err(e) => warn!("pretrained classifier unavailable, using heuristics: {}", e),
            }
        }

        let state = Arc::new(AppState::new(Arc::new(engine), &cfg));
        server::serve(&cfg.listen, state, cfg.max_body_bytes).await
    }

    /// Layers the command line over the config file.
    fn resolve_config(&self) -> Result<ServerConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(listen) = &self.listen {
            cfg.listen = listen.clone();
        }
        cfg.api_keys.extend(self.api_keys.iter().cloned());
        cfg.finalize()?;
        Ok(cfg)
    }
}
