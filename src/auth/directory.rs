use crate::config::AccountsConfig;
use anyhow::Context;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// 启动时构建的只读查找表，进程生命周期内不再修改
#[derive(Debug, Clone)]
pub struct AccountDirectory {
    /// 文件中的非空行，保留重复项用于计数
    known_usernames: Vec<String>,
    known_lookup: HashSet<String>,
    password_invalid_users: HashSet<String>,
    special_messages: HashMap<String, String>,
}

impl AccountDirectory {
    pub fn new(known_usernames: Vec<String>, accounts: &AccountsConfig) -> Self {
        let known_lookup = known_usernames.iter().cloned().collect();

        let password_invalid_users = accounts
            .password_invalid_users
            .iter()
            .map(|u| u.to_lowercase())
            .collect();

        let special_messages = accounts
            .special_messages
            .iter()
            .filter(|(_, message)| !message.is_empty())
            .map(|(user, message)| (user.to_lowercase(), message.clone()))
            .collect();

        Self {
            known_usernames,
            known_lookup,
            password_invalid_users,
            special_messages,
        }
    }

    /// 从用户名文件加载；文件不存在时启动失败
    pub async fn load(accounts: &AccountsConfig) -> anyhow::Result<Self> {
        let known = load_known_usernames(Path::new(&accounts.payload_file)).await?;
        Ok(Self::new(known, accounts))
    }

    pub fn is_known(&self, username: &str) -> bool {
        self.known_lookup.contains(username)
    }

    /// 调用方传入小写用户名
    pub fn is_password_invalid(&self, lower_username: &str) -> bool {
        self.password_invalid_users.contains(lower_username)
    }

    pub fn special_message(&self, lower_username: &str) -> Option<&str> {
        self.special_messages.get(lower_username).map(String::as_str)
    }

    pub fn payload_count(&self) -> usize {
        self.known_usernames.len()
    }
}

pub async fn load_known_usernames(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("读取用户名文件失败: {}", path.display()))?;

    let usernames = parse_known_usernames(&content);
    tracing::info!("从 {} 加载了 {} 个用户名", path.display(), usernames.len());
    Ok(usernames)
}

pub fn parse_known_usernames(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
