mod auth;
mod config;
mod error;
mod logger;
mod metrics;
mod routes;
mod site;

use auth::{AccountDirectory, LockoutGuard, LoginEvaluator};
use config::Config;
use metrics::Metrics;
use std::sync::Arc;

// 统一的应用状态
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub evaluator: Arc<LoginEvaluator>,
    pub lockout: LockoutGuard, // 进程内唯一的尝试记录
    pub metrics: Arc<Metrics>,
}

impl AppState {
    #[cfg(test)]
    pub fn new(config: Config, known_usernames: Vec<String>) -> anyhow::Result<Self> {
        let directory = Arc::new(AccountDirectory::new(known_usernames, &config.accounts));
        Self::with_directory(config, directory)
    }

    pub fn with_directory(
        config: Config,
        directory: Arc<AccountDirectory>,
    ) -> anyhow::Result<Self> {
        let lockout = LockoutGuard::new(config.lockout.window(), config.lockout.threshold);
        let metrics = Metrics::new().map_err(|e| anyhow::anyhow!("指标注册失败: {}", e))?;

        Ok(Self {
            config: Arc::new(config),
            evaluator: Arc::new(LoginEvaluator::new(directory)),
            lockout,
            metrics: Arc::new(metrics),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志，guard 必须持有到进程结束
    let _log_guard = logger::init_logger(&config.logging)?;

    tracing::info!("配置加载成功");
    tracing::info!("服务器地址: {}:{}", config.server.host, config.server.port);
    tracing::info!(
        "锁定策略: {} 秒内 {} 次尝试",
        config.lockout.window_seconds,
        config.lockout.threshold
    );

    // 用户名文件缺失时直接启动失败
    let directory = Arc::new(
        AccountDirectory::load(&config.accounts)
            .await
            .map_err(|e| anyhow::anyhow!("用户名表初始化失败: {:#}", e))?,
    );

    let state = AppState::with_directory(config, directory)?;
    let lockout = state.lockout.clone();
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = routes::app(state);

    // 启动服务器
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 登录演示服务启动成功: http://{}", addr);
    tracing::info!("📝 登录接口: POST http://{}/login", addr);
    tracing::info!("💓 健康检查: GET http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(lockout))
        .await?;

    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal(lockout: LockoutGuard) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("无法监听 Ctrl+C 信号: {}", e);
        return;
    }

    tracing::info!(
        "收到关闭信号，窗口内仍有 {} 次登录尝试记录",
        lockout.recent_attempts().await
    );
}
