//! 工具模块
//!
//! 配置文件、日志和桌面通知

pub mod config;
pub mod logger;
pub mod notification;
