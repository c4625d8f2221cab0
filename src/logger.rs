use crate::config::LoggingConfig;
use anyhow::Result;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "intruder_demo=debug,tower_http=debug";

/// 初始化日志系统
///
/// 特性：
/// - 同时输出到控制台和文件（文件输出可关闭）
/// - 按日期滚动日志文件，只保留最近 `max_files` 个
///
/// 返回的 guard 需要在 main 中一直持有，丢弃后文件写入线程会停止
pub fn init_logger(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (subscriber, guard) = build_subscriber(config)?;
    subscriber.init();
    Ok(guard)
}

/// 组装订阅者但不安装为全局默认
fn build_subscriber(
    config: &LoggingConfig,
) -> Result<(impl Subscriber + Send + Sync + 'static, Option<WorkerGuard>)> {
    let timer = tracing_subscriber::fmt::time::OffsetTime::new(
        time::UtcOffset::UTC,
        time::format_description::well_known::Rfc3339,
    );

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    // 文件输出层，关闭时为 None
    let (file_layer, guard) = if config.file_output {
        std::fs::create_dir_all(&config.dir)?;
        let (writer, guard) = tracing_appender::non_blocking(build_file_appender(config)?);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_timer(timer.clone())
            .with_ansi(false) // 文件中不使用颜色代码
            .with_target(true)
            .with_thread_ids(true);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // 控制台输出层（人类可读格式）
    let console_layer = tracing_subscriber::fmt::layer()
        .with_timer(timer)
        .with_target(true)
        .with_thread_ids(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer);

    Ok((subscriber, guard))
}

fn build_file_appender(config: &LoggingConfig) -> Result<RollingFileAppender> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .max_log_files(config.max_files.max(1))
        .build(&config.dir)?;
    Ok(appender)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log_dir(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("intruder_demo_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.dir, "logs");
        assert_eq!(config.file_prefix, "intruder_demo");
        assert_eq!(config.max_files, 5);
        assert!(config.file_output);
    }

    #[test]
    fn test_build_file_appender_creates_in_dir() {
        let dir = temp_log_dir("appender");
        std::fs::create_dir_all(&dir).unwrap();
        let config = LoggingConfig {
            dir: dir.to_string_lossy().into_owned(),
            max_files: 0,
            ..LoggingConfig::default()
        };

        assert!(build_file_appender(&config).is_ok());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_console_only_subscriber() {
        let dir = temp_log_dir("console_only");
        let config = LoggingConfig {
            dir: dir.to_string_lossy().into_owned(),
            file_output: false,
            ..LoggingConfig::default()
        };

        let (subscriber, guard) = build_subscriber(&config).unwrap();
        assert!(guard.is_none());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("仅控制台输出");
        });

        // 关闭文件输出时不创建日志目录
        assert!(!dir.exists());
    }

    #[test]
    fn test_file_and_console_subscriber() {
        let dir = temp_log_dir("file_output");
        let config = LoggingConfig {
            dir: dir.to_string_lossy().into_owned(),
            ..LoggingConfig::default()
        };

        let (subscriber, guard) = build_subscriber(&config).unwrap();
        assert!(guard.is_some());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("写入日志文件");
        });
        drop(guard);

        let has_log_file = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .any(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.starts_with("intruder_demo") && name.ends_with(".log")
            });
        std::fs::remove_dir_all(&dir).ok();
        assert!(has_log_file);
    }
}
