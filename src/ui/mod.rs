//! 用户界面模块
//!
//! 时间选择窗口和系统托盘

pub mod manager;
pub mod tray;

pub use manager::UIFlags;
