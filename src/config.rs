//! Configuração do sapateiro carregada a partir de `sapateiro.toml`.
//!
//! Valores não presentes no arquivo usam defaults. As variáveis de ambiente
//! `SAPATEIRO_TOKEN` e `SAPATEIRO_API_URL` têm precedência sobre o arquivo.
//! O token de sessão fica num arquivo separado (`token_file`), gravado pelo
//! comando `login`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_API_URL;

pub const CONFIG_FILE: &str = "sapateiro.toml";
pub const TOKEN_ENV: &str = "SAPATEIRO_TOKEN";
pub const API_URL_ENV: &str = "SAPATEIRO_API_URL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SapateiroConfig {
    /// URL base do backend de pedidos.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Token de acesso. Se vazio, é lido de `token_file`.
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,

    /// Timeout de cada requisição, em segundos.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Intervalo de atualização dos modos `--watch`.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Filtro do tracing quando `RUST_LOG` não está definido.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_token_file() -> PathBuf {
    PathBuf::from("sapateiro.token")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for SapateiroConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: String::new(),
            token_file: default_token_file(),
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            log_filter: default_log_filter(),
        }
    }
}

impl SapateiroConfig {
    /// Carrega `sapateiro.toml` do diretório atual e aplica o ambiente.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok());
        config.load_token()?;
        Ok(config)
    }

    /// Lê um arquivo de configuração. Usa defaults se ele não existir.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(TOKEN_ENV)
            && !token.trim().is_empty()
        {
            self.token = token.trim().to_string();
        }
        if let Some(url) = lookup(API_URL_ENV)
            && !url.trim().is_empty()
        {
            self.api_url = url.trim().to_string();
        }
    }

    /// Preenche `token` a partir de `token_file` quando ainda estiver vazio.
    pub fn load_token(&mut self) -> Result<()> {
        if !self.token.is_empty() || !self.token_file.exists() {
            return Ok(());
        }
        let token = std::fs::read_to_string(&self.token_file)
            .with_context(|| format!("failed to read {}", self.token_file.display()))?;
        self.token = token.trim().to_string();
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        Some(self.token.clone()).filter(|t| !t.is_empty())
    }

    pub fn save_token(&mut self, token: &str) -> Result<()> {
        std::fs::write(&self.token_file, format!("{token}\n"))
            .with_context(|| format!("failed to write {}", self.token_file.display()))?;
        self.token = token.to_string();
        Ok(())
    }
}
