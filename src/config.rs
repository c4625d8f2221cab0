use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub lockout: LockoutConfig,
    #[serde(default)]
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// 登录锁定：滑动窗口内的尝试次数达到阈值即拒绝
#[derive(Debug, Clone, Deserialize)]
pub struct LockoutConfig {
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    #[serde(default = "default_threshold")]
    pub threshold: usize,
}

impl LockoutConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            threshold: default_threshold(),
        }
    }
}

fn default_window_seconds() -> u64 {
    30
}

fn default_threshold() -> usize {
    25
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsConfig {
    /// 已知用户名列表文件，每行一个
    #[serde(default = "default_payload_file")]
    pub payload_file: String,
    /// 这些用户无论密码是什么都返回 "Password invalid."
    #[serde(default = "default_password_invalid_users")]
    pub password_invalid_users: Vec<String>,
    /// 密码等于用户名时返回的专属消息（键为小写用户名）
    #[serde(default = "default_special_messages")]
    pub special_messages: HashMap<String, String>,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            payload_file: default_payload_file(),
            password_invalid_users: default_password_invalid_users(),
            special_messages: default_special_messages(),
        }
    }
}

fn default_payload_file() -> String {
    "payloads.txt".to_string()
}

fn default_password_invalid_users() -> Vec<String> {
    ["patel", "mendoza", "hill"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_special_messages() -> HashMap<String, String> {
    HashMap::from([
        (
            "doe".to_string(),
            "Welcome to intranet. News: We backup all of your C:\\ drive starting 2026-01-01."
                .to_string(),
        ),
        (
            "tay".to_string(),
            "Error: Employee contract not found (probably expired).".to_string(),
        ),
    ])
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// 保留的日志文件数量
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_file_output")]
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_prefix: default_file_prefix(),
            max_files: default_max_files(),
            file_output: default_file_output(),
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_file_prefix() -> String {
    "intruder_demo".to_string()
}

fn default_max_files() -> usize {
    5
}

fn default_file_output() -> bool {
    true
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // 加载 .env 文件 (如果存在)
        let _ = dotenvy::dotenv();

        // config.toml 可选，环境变量优先级更高，例如 INTRUDER__SERVER__PORT=9000
        let config: Config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("INTRUDER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.lockout.threshold == 0 {
            anyhow::bail!("lockout.threshold 必须大于 0");
        }
        if self.lockout.window_seconds == 0 {
            anyhow::bail!("lockout.window_seconds 必须大于 0");
        }
        if self.accounts.payload_file.trim().is_empty() {
            anyhow::bail!("accounts.payload_file 未设置");
        }
        Ok(())
    }
}
