//! 核心数据类型定义
//!
//! 定义定时关机用到的时刻、状态和错误类型

use chrono::{DateTime, Duration, Local, NaiveTime, Timelike};
use std::fmt;
use thiserror::Error;

/// 核心模块错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// 小时或分钟超出范围
    #[error("无效的时刻: {hour}:{minute}")]
    InvalidTimeOfDay { hour: u32, minute: u32 },
    /// 已经设置过关机时间
    #[error("定时关机已设置，无法修改")]
    AlreadyArmed,
}

/// 一天中的某个时刻（精确到分钟）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    /// 创建时刻，小时范围0-23，分钟范围0-59
    pub fn new(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTimeOfDay { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    /// 取当前时间的时和分，作为选择框的默认值
    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// 转换为秒数为0的 `NaiveTime`
    pub fn naive_time(&self) -> NaiveTime {
        // 构造时已校验范围
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// 定时关机状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    /// 空闲，尚未设置关机时间
    Idle,
    /// 已设置，每秒检查一次
    Armed { deadline: DateTime<Local> },
    /// 已触发关机（终态）
    Fired,
}

impl fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleState::Idle => write!(f, "空闲"),
            ScheduleState::Armed { deadline } => {
                write!(f, "等待中，目标时间 {}", deadline.format("%Y-%m-%d %H:%M:%S"))
            },
            ScheduleState::Fired => write!(f, "已触发关机"),
        }
    }
}

/// 一次检查的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 未设置关机时间
    Idle,
    /// 尚未到达，附带剩余时间
    Waiting { remaining: Duration },
    /// 本次检查触发了关机
    Fired,
    /// 之前已经触发过
    AlreadyFired,
}

/// 宿主平台
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    /// Linux 和 macOS
    Unix,
    Unsupported,
}

impl Platform {
    /// 检测当前编译目标平台
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(any(target_os = "linux", target_os = "macos")) {
            Platform::Unix
        } else {
            Platform::Unsupported
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "Windows"),
            Platform::Unix => write!(f, "Unix"),
            Platform::Unsupported => write!(f, "不支持的平台"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_range() {
        assert!(TimeOfDay::new(0, 0).is_ok());
        assert!(TimeOfDay::new(23, 59).is_ok());
        assert_eq!(
            TimeOfDay::new(24, 0),
            Err(ScheduleError::InvalidTimeOfDay { hour: 24, minute: 0 })
        );
        assert!(TimeOfDay::new(12, 60).is_err());
    }

    #[test]
    fn test_time_of_day_display() {
        assert_eq!(TimeOfDay::new(7, 5).unwrap().to_string(), "07:05");
        assert_eq!(TimeOfDay::new(23, 30).unwrap().to_string(), "23:30");
    }

    #[test]
    fn test_from_time_drops_seconds() {
        let time = NaiveTime::from_hms_opt(14, 29, 59).unwrap();
        assert_eq!(TimeOfDay::from_time(&time), TimeOfDay::new(14, 29).unwrap());
    }

    #[test]
    fn test_platform_detection() {
        let platform = Platform::current();
        if cfg!(target_os = "linux") {
            assert_eq!(platform, Platform::Unix);
        }
        if cfg!(target_os = "windows") {
            assert_eq!(platform, Platform::Windows);
        }
    }
}
