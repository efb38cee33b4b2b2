//! 桌面通知
//!
//! 窗口被隐藏或最小化时提醒用户程序仍在后台运行

use log::{info, warn};
use notify_rust::Notification;

/// 通知标题
pub const NOTIFICATION_TITLE: &str = "定时关机程序";
/// 隐藏到托盘时的提示
pub const HIDDEN_TO_TRAY: &str = "程序已最小化到托盘";
/// 没有托盘、窗口被最小化时的提示
pub const MINIMIZED_WHILE_ARMED: &str = "窗口已最小化，定时关机仍在等待";

/// 在后台线程显示一条系统通知，失败只记录日志
pub fn show(body: &str) {
    info!("系统通知: {} - {}", NOTIFICATION_TITLE, body);

    let body = body.to_string();
    let spawned = std::thread::Builder::new()
        .name("notification".to_string())
        .spawn(move || {
            if let Err(e) = Notification::new()
                .appname("Shutclock")
                .summary(NOTIFICATION_TITLE)
                .body(&body)
                .show()
            {
                warn!("显示系统通知失败: {}", e);
            }
        });

    if let Err(e) = spawned {
        warn!("启动通知线程失败: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct() {
        assert_ne!(HIDDEN_TO_TRAY, MINIMIZED_WHILE_ARMED);
        assert!(MINIMIZED_WHILE_ARMED.contains("定时关机"));
    }
}
