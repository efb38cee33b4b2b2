//! 配置管理模块
//!
//! 负责配置文件的加载和保存。配置文件只保存程序设置，不保存关机任务。

use anyhow::{Context, Result};
use dirs::config_dir;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 配置目录名
const APP_DIR_NAME: &str = "Shutclock";

/// 应用程序配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 界面设置
    pub ui: UISettings,
    /// 关机设置
    pub shutdown: ShutdownSettings,
    /// 日志设置
    pub logging: LoggingSettings,
}

/// 界面设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UISettings {
    /// 关闭窗口时隐藏到托盘而不是退出
    pub minimize_to_tray: bool,
    /// 窗口大小
    pub window_size: (f32, f32),
    /// 窗口隐藏或最小化时弹出桌面通知
    pub show_notifications: bool,
}

/// 关机设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownSettings {
    /// Windows 关机命令的宽限秒数
    pub grace_seconds: u32,
    /// 演练模式，到时间只记录日志
    pub dry_run: bool,
}

/// 日志设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// 日志级别
    pub level: String,
    /// 是否写入日志文件
    pub file_logging: bool,
    /// 日志文件保留天数
    pub keep_days: u32,
}

impl Default for UISettings {
    fn default() -> Self {
        Self {
            minimize_to_tray: true,
            window_size: (300.0, 150.0),
            show_notifications: true,
        }
    }
}

impl Default for ShutdownSettings {
    fn default() -> Self {
        Self {
            grace_seconds: 1,
            dry_run: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            keep_days: 7,
        }
    }
}

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置文件路径
    config_path: PathBuf,
    /// 当前配置
    config: AppConfig,
}

impl ConfigManager {
    /// 从默认位置加载配置
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(config_path)
    }

    /// 从指定路径加载配置
    pub fn load_from(config_path: PathBuf) -> Result<Self> {
        let config = Self::load_config(&config_path)?;
        Ok(Self { config_path, config })
    }

    /// 默认配置文件路径，目录不存在时创建
    fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("无法获取配置目录")?;
        let app_config_dir = config_dir.join(APP_DIR_NAME);

        if !app_config_dir.exists() {
            fs::create_dir_all(&app_config_dir)
                .with_context(|| format!("创建配置目录失败: {:?}", app_config_dir))?;
            info!("创建配置目录: {:?}", app_config_dir);
        }

        Ok(app_config_dir.join("config.json"))
    }

    /// 加载配置文件
    ///
    /// 文件不存在时写出默认配置；格式错误时备份原文件再写出默认配置。
    fn load_config(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            info!("配置文件不存在，使用默认配置: {:?}", path);
            let default_config = AppConfig::default();
            Self::save_config_to_file(&default_config, path)?;
            return Ok(default_config);
        }

        info!("加载配置文件: {:?}", path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("配置文件格式错误: {}, 使用默认配置", e);

                let backup_path = path.with_extension("json.backup");
                if let Err(backup_err) = fs::copy(path, &backup_path) {
                    warn!("备份损坏的配置文件失败: {}", backup_err);
                }

                let default_config = AppConfig::default();
                Self::save_config_to_file(&default_config, path)?;
                Ok(default_config)
            },
        }
    }

    fn save_config_to_file(config: &AppConfig, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        fs::write(path, json).with_context(|| format!("写入配置文件失败: {:?}", path))?;
        info!("配置文件保存成功: {:?}", path);
        Ok(())
    }

    /// 获取当前配置
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取配置文件路径
    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.ui.minimize_to_tray);
        assert_eq!(config.ui.window_size, (300.0, 150.0));
        assert!(config.ui.show_notifications);
        assert_eq!(config.shutdown.grace_seconds, 1);
        assert!(!config.shutdown.dry_run);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let manager = ConfigManager::load_from(path.clone()).unwrap();
        assert_eq!(manager.get_config(), &AppConfig::default());
        assert!(path.exists());
        assert_eq!(manager.get_config_path(), path.as_path());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "shutdown": { "dry_run": true } }"#).unwrap();

        let manager = ConfigManager::load_from(path).unwrap();
        let config = manager.get_config();
        assert!(config.shutdown.dry_run);
        assert_eq!(config.shutdown.grace_seconds, 1);
        assert!(config.ui.minimize_to_tray);
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let manager = ConfigManager::load_from(path.clone()).unwrap();
        assert_eq!(manager.get_config(), &AppConfig::default());

        let backup = dir.path().join("config.json.backup");
        assert_eq!(fs::read_to_string(backup).unwrap(), "{ not json");

        let rewritten: AppConfig = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rewritten, AppConfig::default());
    }
}
