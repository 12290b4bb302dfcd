use std::env;
use std::net::SocketAddr;

use anyhow::{bail, Context};

use crate::format::DEFAULT_WIDTH;

/// Everything the binary needs, resolved once at startup and handed down
/// explicitly. Nothing below `main` reads the process environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub wrap_width: usize,
    pub serper_api_key: Option<String>,
}

impl AppConfig {
    const WRAP_WIDTH_VARS: [&'static str; 1] = ["MEDCREW_WRAP_WIDTH"];
    const SERPER_KEY_VARS: [&'static str; 1] = ["SERPER_API_KEY"];

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let wrap_width = match read_var(&lookup, &Self::WRAP_WIDTH_VARS) {
            Some(raw) => parse_width(&raw).context("Invalid MEDCREW_WRAP_WIDTH")?,
            None => DEFAULT_WIDTH,
        };

        Ok(Self {
            llm: LlmConfig::from_lookup(&lookup)?,
            server: ServerConfig::from_lookup(&lookup)?,
            wrap_width,
            serper_api_key: read_var(&lookup, &Self::SERPER_KEY_VARS),
        })
    }

    pub fn with_wrap_width(mut self, width: usize) -> anyhow::Result<Self> {
        if width == 0 {
            bail!("wrap width must be at least one column");
        }
        self.wrap_width = width;
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
}

impl LlmConfig {
    pub const DEFAULT_MODEL: &'static str = "gpt-3.5-turbo";
    const DEFAULT_TEMPERATURE: f32 = 0.2;

    const API_KEY_VARS: [&'static str; 1] = ["OPENAI_API_KEY"];
    const BASE_URL_VARS: [&'static str; 1] = ["OPENAI_BASE_URL"];
    const MODEL_VARS: [&'static str; 2] = ["OPENAI_MODEL_NAME", "MEDCREW_MODEL"];
    const TEMPERATURE_VARS: [&'static str; 1] = ["MEDCREW_TEMPERATURE"];

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let temperature = match read_var(lookup, &Self::TEMPERATURE_VARS) {
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .with_context(|| format!("Invalid MEDCREW_TEMPERATURE value {raw:?}"))?,
            None => Self::DEFAULT_TEMPERATURE,
        };

        Ok(Self {
            api_key: read_var(lookup, &Self::API_KEY_VARS),
            base_url: read_var(lookup, &Self::BASE_URL_VARS),
            model: read_var(lookup, &Self::MODEL_VARS)
                .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            temperature,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    const DEFAULT_BIND_ADDR: &'static str = "127.0.0.1:8501";
    const BIND_ADDR_VARS: [&'static str; 1] = ["MEDCREW_BIND_ADDR"];

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let raw = read_var(lookup, &Self::BIND_ADDR_VARS)
            .unwrap_or_else(|| Self::DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw
            .trim()
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid MEDCREW_BIND_ADDR value {raw:?}"))?;

        Ok(Self { bind_addr })
    }
}

fn read_var(
    lookup: &impl Fn(&str) -> Option<String>,
    candidates: &[&'static str],
) -> Option<String> {
    candidates
        .iter()
        .find_map(|key| lookup(*key))
        .filter(|value| !value.trim().is_empty())
}

fn parse_width(raw: &str) -> anyhow::Result<usize> {
    let width: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("expected a positive integer, got {raw:?}"))?;
    if width == 0 {
        bail!("wrap width must be at least one column");
    }
    Ok(width)
}
