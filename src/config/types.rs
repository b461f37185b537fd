use serde::Deserialize;
use std::path::PathBuf;

use crate::catalog::Metadata;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub feed: FeedConfig,
}

impl Config {
    /// Derive the immutable feed metadata used by the catalog builder.
    pub fn metadata(&self) -> Metadata {
        Metadata::new(
            &self.feed.title,
            &self.feed.description,
            &self.feed.language,
            &self.feed.external_url,
            self.feed.cover_url.as_deref(),
            &self.feed.root,
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// How long in-flight requests may run after a shutdown signal
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_shutdown_grace() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default = "default_language")]
    pub language: String,

    /// Prefix for every public link in the feed (should include protocol)
    #[serde(default = "default_external_url")]
    pub external_url: String,

    /// Directory to serve
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Cover image URL (defaults to the built-in `/cover.png`)
    #[serde(default)]
    pub cover_url: Option<String>,
}

fn default_title() -> String {
    "My Podcast".to_string()
}
fn default_description() -> String {
    "Whatever".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_external_url() -> String {
    "http://localhost:8080/".to_string()
}
fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_refresh_interval() -> u64 {
    60
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: default_description(),
            language: default_language(),
            external_url: default_external_url(),
            root: default_root(),
            refresh_interval_secs: default_refresh_interval(),
            cover_url: None,
        }
    }
}
