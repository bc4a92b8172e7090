use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Runtime configuration: bind address, database path, link bases, and
/// the cleanup cadence.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    /// Public base URL, used only to build shareable links.
    pub base_url: String,
    /// WebSocket endpoint URL handed to clients for live sessions.
    pub ws_url: String,
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    storage: StorageSection,
    #[serde(default)]
    links: LinksSection,
    #[serde(default)]
    cleanup: CleanupSection,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StorageSection {
    #[serde(default = "default_db_path")]
    path: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LinksSection {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_ws_url")]
    ws_url: String,
}

impl Default for LinksSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: default_ws_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CleanupSection {
    #[serde(default = "default_cleanup_interval")]
    interval_secs: u64,
}

impl Default for CleanupSection {
    fn default() -> Self {
        Self {
            interval_secs: default_cleanup_interval(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "codeurl.db".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:3000/api/live".to_string()
}

fn default_cleanup_interval() -> u64 {
    600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            base_url: default_base_url(),
            ws_url: default_ws_url(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(file_config) = load_from_file()? {
            return Ok(Self {
                host: file_config.server.host,
                port: file_config.server.port,
                db_path: file_config.storage.path,
                base_url: file_config.links.base_url,
                ws_url: file_config.links.ws_url,
                cleanup_interval_secs: file_config.cleanup.interval_secs,
            });
        }

        Ok(Self::from_env())
    }

    fn from_env() -> Self {
        let host = env::var("CODEURL_HOST").unwrap_or_else(|_| default_host());
        let port = env::var("CODEURL_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(default_port);
        let db_path = env::var("CODEURL_DB_PATH").unwrap_or_else(|_| default_db_path());
        let base_url = env::var("CODEURL_BASE_URL").unwrap_or_else(|_| default_base_url());
        let ws_url = env::var("CODEURL_WS_URL").unwrap_or_else(|_| default_ws_url());
        let cleanup_interval_secs = env::var("CODEURL_CLEANUP_INTERVAL")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or_else(default_cleanup_interval);

        Self {
            host,
            port,
            db_path,
            base_url,
            ws_url,
            cleanup_interval_secs,
        }
    }

    /// Shareable link for a snippet share-id or project slug.
    pub fn share_url(&self, slug: &str) -> String {
        format!("{}/share/{}", self.base_url, slug)
    }

    /// Live-session socket URL for a snippet share-id.
    pub fn live_url_for_share(&self, share_id: &str) -> String {
        format!("{}?shareId={}", self.ws_url, share_id)
    }

    /// Live-session socket URL for a project.
    pub fn live_url_for_project(&self, project_id: &str) -> String {
        format!("{}?projectId={}", self.ws_url, project_id)
    }
}

fn load_from_file() -> anyhow::Result<Option<FileConfig>> {
    let config_path = env::var("CODEURL_CONFIG").ok();
    let path = if let Some(path) = config_path {
        Some(path)
    } else if Path::new("codeurl.toml").exists() {
        Some("codeurl.toml".to_string())
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(None);
    };

    let contents = fs::read_to_string(&path)
        .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path, err))?;
    let parsed: FileConfig = toml::from_str(&contents)
        .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path, err))?;
    Ok(Some(parsed))
}
