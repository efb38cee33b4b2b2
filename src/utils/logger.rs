//! 日志管理模块
//!
//! 负责日志系统的初始化和旧日志清理

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use dirs::data_local_dir;
use env_logger::{Builder, Env, Target};
use log::{info, warn, LevelFilter};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;

use crate::utils::config::LoggingSettings;

static INIT: Once = Once::new();

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "shutclock_";

/// 日志管理器
#[derive(Debug)]
pub struct LoggerManager {
    /// 日志文件路径，未启用文件日志时为空
    log_file_path: Option<PathBuf>,
    /// 日志级别
    log_level: LevelFilter,
}

impl LoggerManager {
    /// 根据日志设置创建管理器，日志文件放在本地数据目录下
    pub fn from_settings(settings: &LoggingSettings) -> Result<Self> {
        let log_dir = if settings.file_logging {
            let data_dir = data_local_dir().context("无法获取本地数据目录")?;
            Some(data_dir.join("Shutclock").join("logs"))
        } else {
            None
        };
        Self::new(parse_level(&settings.level), log_dir.as_deref())
    }

    /// 创建日志管理器
    ///
    /// `log_dir` 为空时只输出到控制台
    pub fn new(log_level: LevelFilter, log_dir: Option<&Path>) -> Result<Self> {
        let log_file_path = match log_dir {
            Some(dir) => Some(Self::create_log_file_path(dir)?),
            None => None,
        };

        Ok(Self {
            log_file_path,
            log_level,
        })
    }

    /// 生成当天的日志文件路径
    fn create_log_file_path(log_dir: &Path) -> Result<PathBuf> {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir)
                .with_context(|| format!("创建日志目录失败: {:?}", log_dir))?;
        }

        let log_filename = format!("{}{}.log", LOG_FILE_PREFIX, Local::now().format("%Y%m%d"));
        Ok(log_dir.join(log_filename))
    }

    /// 初始化全局日志，重复调用会被忽略
    ///
    /// `RUST_LOG` 环境变量优先于配置的级别
    pub fn init(&self) -> Result<()> {
        let mut result = Ok(());
        INIT.call_once(|| {
            result = self.init_internal();
        });
        result
    }

    fn init_internal(&self) -> Result<()> {
        let mut builder = Builder::new();
        builder.filter_level(self.log_level);
        builder.parse_env(Env::default());

        builder.format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] [{}:{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        });

        match &self.log_file_path {
            Some(file_path) => {
                let file = fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(file_path)
                    .with_context(|| format!("打开日志文件失败: {:?}", file_path))?;
                builder.target(Target::Pipe(Box::new(file)));
                builder.try_init()?;
                info!("日志系统初始化完成 - 文件: {:?}", file_path);
            },
            None => {
                builder.target(Target::Stdout);
                builder.try_init()?;
                info!("日志系统初始化完成 - 控制台");
            },
        }

        Ok(())
    }

    pub fn get_log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn get_log_file_path(&self) -> Option<&Path> {
        self.log_file_path.as_deref()
    }

    /// 删除超过 `days_to_keep` 天的日志文件，返回删除数量
    pub fn cleanup_old_logs(&self, days_to_keep: u32) -> Result<usize> {
        let Some(log_dir) = self.log_file_path.as_deref().and_then(Path::parent) else {
            return Ok(0);
        };
        if !log_dir.exists() {
            return Ok(0);
        }

        let cutoff_time = Local::now() - chrono::Duration::days(days_to_keep as i64);
        let mut cleaned_count = 0;

        for entry in fs::read_dir(log_dir)? {
            let path = entry?.path();
            if !is_log_file(&path) || Some(path.as_path()) == self.log_file_path.as_deref() {
                continue;
            }

            let modified: DateTime<Local> = fs::metadata(&path)?.modified()?.into();
            if modified < cutoff_time {
                match fs::remove_file(&path) {
                    Ok(_) => {
                        info!("删除旧日志文件: {:?}", path);
                        cleaned_count += 1;
                    },
                    Err(e) => warn!("删除日志文件失败 {:?}: {}", path, e),
                }
            }
        }

        Ok(cleaned_count)
    }
}

/// 本程序生成的日志文件
fn is_log_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().map_or(false, |ext| ext == "log")
        && path
            .file_name()
            .map_or(false, |name| name.to_string_lossy().starts_with(LOG_FILE_PREFIX))
}

/// 日志级别字符串转换，无法识别时为 info
pub fn parse_level(level_str: &str) -> LevelFilter {
    match level_str.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("info"), LevelFilter::Info);
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("verbose"), LevelFilter::Info);
    }

    #[test]
    fn test_console_only_manager() {
        let logger = LoggerManager::new(LevelFilter::Warn, None).unwrap();
        assert_eq!(logger.get_log_level(), LevelFilter::Warn);
        assert!(logger.get_log_file_path().is_none());
        assert_eq!(logger.cleanup_old_logs(7).unwrap(), 0);
    }

    #[test]
    fn test_log_file_path_is_daily() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let logger = LoggerManager::new(LevelFilter::Info, Some(&log_dir)).unwrap();

        let path = logger.get_log_file_path().unwrap();
        assert!(log_dir.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(LOG_FILE_PREFIX));
        assert!(name.ends_with(&format!("{}.log", Local::now().format("%Y%m%d"))));
    }

    #[test]
    fn test_cleanup_old_logs() {
        let dir = tempdir().unwrap();
        let logger = LoggerManager::new(LevelFilter::Info, Some(dir.path())).unwrap();

        let old_log = dir.path().join("shutclock_20000101.log");
        let unrelated = dir.path().join("other_20000101.log");
        fs::write(&old_log, "old").unwrap();
        fs::write(&unrelated, "keep").unwrap();
        let long_ago = SystemTime::now() - Duration::from_secs(30 * 24 * 3600);
        for path in [&old_log, &unrelated] {
            fs::File::options().write(true).open(path).unwrap().set_modified(long_ago).unwrap();
        }
        let fresh_log = dir.path().join("shutclock_29990101.log");
        fs::write(&fresh_log, "fresh").unwrap();

        assert_eq!(logger.cleanup_old_logs(7).unwrap(), 1);
        assert!(!old_log.exists());
        assert!(unrelated.exists());
        assert!(fresh_log.exists());
    }
}
