//! 应用程序主模块
//!
//! 加载配置、初始化日志、选择关机方式，然后启动界面

use anyhow::{anyhow, Result};
use log::{info, warn};

use crate::core::shutdown::{DryRunPowerController, PowerController, SystemPowerController};
use crate::core::types::Platform;
use crate::ui::{self, UIFlags};
use crate::utils::config::{AppConfig, ConfigManager};
use crate::utils::logger::LoggerManager;

/// 应用程序主结构体
pub struct App {
    config: AppConfig,
}

impl App {
    /// 创建应用实例
    ///
    /// 配置文件无法读写时使用默认配置继续运行
    pub fn new() -> Result<Self> {
        let (config, config_path, config_error) = match ConfigManager::new() {
            Ok(manager) => (manager.get_config().clone(), Some(manager.get_config_path().to_path_buf()), None),
            Err(e) => (AppConfig::default(), None, Some(e)),
        };

        let logger = LoggerManager::from_settings(&config.logging)?;
        logger.init()?;
        info!("Shutclock 启动中...");

        if let Some(path) = config_path {
            info!("配置文件: {:?}", path);
        }
        if let Some(e) = config_error {
            warn!("加载配置失败，使用默认配置: {:#}", e);
        }
        info!(
            "日志级别: {}, 日志文件: {:?}",
            logger.get_log_level(),
            logger.get_log_file_path()
        );

        match logger.cleanup_old_logs(config.logging.keep_days) {
            Ok(0) => {},
            Ok(count) => info!("清理了 {} 个旧日志文件", count),
            Err(e) => warn!("清理旧日志失败: {:#}", e),
        }

        Ok(Self { config })
    }

    /// 根据配置选择关机控制器
    fn power_controller(&self) -> Box<dyn PowerController + Send> {
        if self.config.shutdown.dry_run {
            Box::new(DryRunPowerController)
        } else {
            if Platform::current() == Platform::Unsupported {
                warn!("当前平台不支持关机命令，到时间后不会关机");
            }
            Box::new(SystemPowerController::new(self.config.shutdown.grace_seconds))
        }
    }

    /// 启动界面并进入事件循环，窗口关闭后返回
    pub fn run(self) -> Result<()> {
        let power = self.power_controller();
        info!("关机方式: {}", power.describe());

        let flags = UIFlags {
            power,
            minimize_to_tray: self.config.ui.minimize_to_tray,
            show_notifications: self.config.ui.show_notifications,
        };
        ui::manager::run(flags, self.config.ui.window_size)
            .map_err(|e| anyhow!("界面运行失败: {}", e))?;

        info!("Shutclock 已退出");
        Ok(())
    }
}
