//! 关机执行模块
//!
//! 通过 `PowerController` 抽象系统关机命令，便于在测试中替换

use log::{error, info, warn};
use std::process::{Command, Stdio};

use crate::core::types::Platform;

/// 关机能力
///
/// `shutdown_now` 只负责发起关机，不等待、不重试，也不报告结果。
pub trait PowerController {
    /// 立即关机
    fn shutdown_now(&self);

    /// 关机方式描述，用于日志
    fn describe(&self) -> String;
}

/// 调用系统自带的 `shutdown` 命令
#[derive(Debug, Clone)]
pub struct SystemPowerController {
    /// 目标平台
    platform: Platform,
    /// Windows 下 `/t` 参数的宽限秒数
    grace_seconds: u32,
}

impl SystemPowerController {
    /// 创建当前平台的关机控制器
    pub fn new(grace_seconds: u32) -> Self {
        Self::for_platform(Platform::current(), grace_seconds)
    }

    pub fn for_platform(platform: Platform, grace_seconds: u32) -> Self {
        Self {
            platform,
            grace_seconds,
        }
    }

    /// 构造关机命令行（程序名和参数）
    ///
    /// 不支持的平台返回 `None`
    pub fn command_line(&self) -> Option<(&'static str, Vec<String>)> {
        match self.platform {
            Platform::Windows => Some((
                "shutdown",
                vec![
                    "/s".to_string(),
                    "/f".to_string(),
                    "/t".to_string(),
                    self.grace_seconds.to_string(),
                ],
            )),
            Platform::Unix => Some(("shutdown", vec!["-h".to_string(), "now".to_string()])),
            Platform::Unsupported => None,
        }
    }
}

impl PowerController for SystemPowerController {
    fn shutdown_now(&self) {
        let Some((program, args)) = self.command_line() else {
            warn!("当前平台不支持关机命令，忽略关机请求");
            return;
        };

        info!("执行关机命令: {} {}", program, args.join(" "));

        match spawn_and_reap(program, &args) {
            Ok(pid) => info!("关机命令已启动, pid={}", pid),
            Err(e) => error!("启动关机命令失败: {}", e),
        }
    }

    fn describe(&self) -> String {
        match self.command_line() {
            Some((program, args)) => format!("{} ({} {})", self.platform, program, args.join(" ")),
            None => format!("{} (无关机命令)", self.platform),
        }
    }
}

/// 启动子进程后立即返回，由后台线程等待它退出以免留下僵尸进程
fn spawn_and_reap(program: &str, args: &[String]) -> std::io::Result<u32> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let pid = child.id();

    std::thread::spawn(move || match child.wait() {
        Ok(status) => info!("子进程 {} 已退出: {}", pid, status),
        Err(e) => warn!("等待子进程 {} 失败: {}", pid, e),
    });

    Ok(pid)
}

/// 演练模式：只记录日志，不真正关机
#[derive(Debug, Clone, Default)]
pub struct DryRunPowerController;

impl PowerController for DryRunPowerController {
    fn shutdown_now(&self) {
        warn!("演练模式：此时本应关机");
    }

    fn describe(&self) -> String {
        "演练模式 (不关机)".to_string()
    }
}

/// 记录调用次数的关机控制器，测试专用
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingPowerController {
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl RecordingPowerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl PowerController for RecordingPowerController {
    fn shutdown_now(&self) {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn describe(&self) -> String {
        "记录模式".to_string()
    }
}

#[cfg(test)]
impl PowerController for std::sync::Arc<RecordingPowerController> {
    fn shutdown_now(&self) {
        self.as_ref().shutdown_now();
    }

    fn describe(&self) -> String {
        self.as_ref().describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_command_uses_grace() {
        let controller = SystemPowerController::for_platform(Platform::Windows, 1);
        let (program, args) = controller.command_line().unwrap();
        assert_eq!(program, "shutdown");
        assert_eq!(args, vec!["/s", "/f", "/t", "1"]);

        let controller = SystemPowerController::for_platform(Platform::Windows, 30);
        let (_, args) = controller.command_line().unwrap();
        assert_eq!(args.last().map(String::as_str), Some("30"));
    }

    #[test]
    fn test_unix_command() {
        let controller = SystemPowerController::for_platform(Platform::Unix, 1);
        let (program, args) = controller.command_line().unwrap();
        assert_eq!(program, "shutdown");
        assert_eq!(args, vec!["-h", "now"]);
    }

    #[test]
    fn test_unsupported_platform_does_nothing() {
        let controller = SystemPowerController::for_platform(Platform::Unsupported, 1);
        assert!(controller.command_line().is_none());
        // 不应 panic，也不应启动任何进程
        controller.shutdown_now();
        assert!(controller.describe().contains("无关机命令"));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_and_reap_returns_immediately() {
        let pid = spawn_and_reap("sleep", &["0".to_string()]).unwrap();
        assert!(pid > 0);
        assert!(spawn_and_reap("shutclock-no-such-program", &[]).is_err());
    }

    #[test]
    fn test_recording_controller_counts() {
        let controller = RecordingPowerController::new();
        assert_eq!(controller.calls(), 0);
        controller.shutdown_now();
        controller.shutdown_now();
        assert_eq!(controller.calls(), 2);
    }

    #[test]
    fn test_dry_run_describe() {
        let controller = DryRunPowerController;
        controller.shutdown_now();
        assert!(controller.describe().contains("演练"));
    }
}
