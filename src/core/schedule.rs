//! 定时关机状态机
//!
//! `ScheduledShutdown` 由界面事件循环独占持有，每秒调用一次 `tick`

use chrono::{DateTime, Duration, Local};
use log::{debug, info};

use crate::core::deadline::compute_deadline;
use crate::core::shutdown::PowerController;
use crate::core::types::{ScheduleError, ScheduleState, TickOutcome, TimeOfDay};

/// 空闲时的提示文字
pub const IDLE_PROMPT: &str = "请选择关机时间：";
/// 触发后的提示文字
pub const FIRED_MESSAGE: &str = "时间到！正在关机...";

/// 一次定时关机任务
///
/// 状态只会按 `Idle -> Armed -> Fired` 前进，不能取消或重新设置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledShutdown {
    /// 用户选择的时刻
    target: Option<TimeOfDay>,
    /// 当前状态
    state: ScheduleState,
}

impl Default for ScheduledShutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduledShutdown {
    pub fn new() -> Self {
        Self {
            target: None,
            state: ScheduleState::Idle,
        }
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn target(&self) -> Option<TimeOfDay> {
        self.target
    }

    /// 截止时间，仅在 `Armed` 状态下存在
    pub fn deadline(&self) -> Option<DateTime<Local>> {
        match self.state {
            ScheduleState::Armed { deadline } => Some(deadline),
            _ => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline().is_some()
    }

    /// 设置关机时刻并进入 `Armed`
    ///
    /// 只能在 `Idle` 状态调用一次。
    pub fn arm(&mut self, now: DateTime<Local>, at: TimeOfDay) -> Result<DateTime<Local>, ScheduleError> {
        if self.state != ScheduleState::Idle {
            return Err(ScheduleError::AlreadyArmed);
        }

        let deadline = compute_deadline(&now, at);
        self.target = Some(at);
        self.state = ScheduleState::Armed { deadline };

        info!(
            "定时关机已设置: {} (时间戳 {})",
            deadline.format("%Y-%m-%d %H:%M:%S"),
            deadline.timestamp()
        );
        Ok(deadline)
    }

    /// 检查是否到达截止时间，到达时调用一次 `power.shutdown_now()`
    pub fn tick(&mut self, now: DateTime<Local>, power: &dyn PowerController) -> TickOutcome {
        match self.state {
            ScheduleState::Idle => TickOutcome::Idle,
            ScheduleState::Fired => TickOutcome::AlreadyFired,
            ScheduleState::Armed { deadline } if now < deadline => {
                let remaining = deadline - now;
                debug!("距离关机还有 {} 秒", remaining.num_seconds());
                TickOutcome::Waiting { remaining }
            },
            ScheduleState::Armed { .. } => {
                self.state = ScheduleState::Fired;
                info!("到达关机时间，开始关机");
                power.shutdown_now();
                TickOutcome::Fired
            },
        }
    }

    /// 界面上显示的状态文字
    pub fn status_text(&self, now: DateTime<Local>) -> String {
        match (self.state, self.target) {
            (ScheduleState::Armed { deadline }, Some(target)) => format!(
                "定时关机设置为 {}，等待到达...（剩余 {}）",
                target,
                format_duration(&(deadline - now))
            ),
            (ScheduleState::Fired, _) => FIRED_MESSAGE.to_string(),
            _ => IDLE_PROMPT.to_string(),
        }
    }
}

/// 把剩余时间格式化为 `hh:mm:ss`，负数按0处理
pub fn format_duration(duration: &Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
