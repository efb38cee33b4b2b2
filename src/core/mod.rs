//! 核心业务逻辑模块
//!
//! 截止时间计算、定时关机状态机和系统关机调用

pub mod deadline;
pub mod schedule;
pub mod shutdown;
pub mod types;
