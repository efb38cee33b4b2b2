//! 系统托盘模块
//!
//! 窗口隐藏后保留托盘图标，可以恢复窗口或退出程序。
//! 只在 Windows 和 macOS 上创建托盘；Linux 下 tray-icon 依赖 GTK 主循环，iced 不提供。

#[cfg(any(target_os = "windows", target_os = "macos"))]
pub use native::TrayManager;
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub use unsupported::TrayManager;

/// 托盘标题前缀
const TOOLTIP_PREFIX: &str = "定时关机";

const ICON_SIZE: u32 = 16;

/// 托盘触发的操作
#[cfg_attr(not(any(target_os = "windows", target_os = "macos")), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    /// 显示主窗口
    ShowWindow,
    /// 退出程序
    Exit,
}

/// 托盘提示文字
#[cfg_attr(not(any(target_os = "windows", target_os = "macos")), allow(dead_code))]
fn tooltip_for(status: &str) -> String {
    if status.is_empty() {
        TOOLTIP_PREFIX.to_string()
    } else {
        format!("{} - {}", TOOLTIP_PREFIX, status)
    }
}

/// 生成16x16的RGBA图标：黑框红底
#[cfg_attr(not(any(target_os = "windows", target_os = "macos")), allow(dead_code))]
fn generate_icon_data() -> Vec<u8> {
    let mut data = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);

    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            if (2..=13).contains(&x) && (2..=13).contains(&y) {
                data.extend_from_slice(&[200, 50, 50, 255]);
            } else {
                data.extend_from_slice(&[0, 0, 0, 255]);
            }
        }
    }

    data
}

#[cfg(any(target_os = "windows", target_os = "macos"))]
mod native {
    use anyhow::{Context, Result};
    use log::{info, warn};
    use tray_icon::{
        menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
        Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent,
    };

    use super::{generate_icon_data, tooltip_for, TrayAction, ICON_SIZE};

    /// 托盘菜单项ID
    #[derive(Debug, Clone)]
    pub(super) struct TrayMenuIds {
        pub(super) show: MenuId,
        pub(super) quit: MenuId,
    }

    impl TrayMenuIds {
        pub(super) fn action_for(&self, id: &MenuId) -> Option<TrayAction> {
            if *id == self.show {
                Some(TrayAction::ShowWindow)
            } else if *id == self.quit {
                Some(TrayAction::Exit)
            } else {
                None
            }
        }
    }

    /// 托盘图标管理器
    pub struct TrayManager {
        /// 托盘图标，drop 时自动移除
        tray_icon: TrayIcon,
        menu_ids: TrayMenuIds,
    }

    impl TrayManager {
        /// 创建托盘图标和右键菜单
        pub fn new() -> Result<Self> {
            info!("初始化系统托盘图标");

            let menu = Menu::new();
            let show_item = MenuItem::new("显示主窗口", true, None);
            let quit_item = MenuItem::new("退出", true, None);
            menu.append(&show_item)?;
            menu.append(&PredefinedMenuItem::separator())?;
            menu.append(&quit_item)?;

            let icon = Icon::from_rgba(generate_icon_data(), ICON_SIZE, ICON_SIZE)
                .context("创建托盘图标失败")?;

            let tray_icon = TrayIconBuilder::new()
                .with_menu(Box::new(menu))
                .with_tooltip(tooltip_for(""))
                .with_icon(icon)
                .build()
                .context("创建系统托盘失败")?;

            info!("系统托盘图标初始化成功");
            Ok(Self {
                tray_icon,
                menu_ids: TrayMenuIds {
                    show: show_item.id().clone(),
                    quit: quit_item.id().clone(),
                },
            })
        }

        /// 取出所有待处理的托盘和菜单事件
        pub fn poll_actions(&self) -> Vec<TrayAction> {
            let mut actions = Vec::new();

            while let Ok(event) = TrayIconEvent::receiver().try_recv() {
                if let TrayIconEvent::Click {
                    button: MouseButton::Left,
                    button_state: MouseButtonState::Up,
                    ..
                } = event
                {
                    actions.push(TrayAction::ShowWindow);
                }
            }

            while let Ok(event) = MenuEvent::receiver().try_recv() {
                info!("托盘菜单点击: {:?}", event.id);
                if let Some(action) = self.menu_ids.action_for(&event.id) {
                    actions.push(action);
                }
            }

            actions
        }

        /// 用状态文字更新托盘提示
        pub fn set_status(&self, status: &str) {
            if let Err(e) = self.tray_icon.set_tooltip(Some(tooltip_for(status))) {
                warn!("更新托盘提示失败: {}", e);
            }
        }
    }

    impl std::fmt::Debug for TrayManager {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("TrayManager")
                .field("tray_icon", &"<TrayIcon>")
                .field("menu_ids", &self.menu_ids)
                .finish()
        }
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
mod unsupported {
    use anyhow::{bail, Result};

    use super::TrayAction;

    /// 不支持托盘的平台上的占位实现，`new` 总是失败
    #[derive(Debug)]
    pub struct TrayManager {
        _private: (),
    }

    impl TrayManager {
        pub fn new() -> Result<Self> {
            bail!("当前平台不支持系统托盘")
        }

        pub fn poll_actions(&self) -> Vec<TrayAction> {
            Vec::new()
        }

        pub fn set_status(&self, _status: &str) {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_data_size() {
        let data = generate_icon_data();
        assert_eq!(data.len(), 16 * 16 * 4);
        // 左上角是边框，中心是红色
        assert_eq!(&data[0..4], &[0u8, 0, 0, 255]);
        let center = ((8 * 16 + 8) * 4) as usize;
        assert_eq!(&data[center..center + 4], &[200u8, 50, 50, 255]);
    }

    #[test]
    fn test_tooltip() {
        assert_eq!(tooltip_for(""), "定时关机");
        assert_eq!(tooltip_for("时间到！正在关机..."), "定时关机 - 时间到！正在关机...");
    }

    #[cfg(any(target_os = "windows", target_os = "macos"))]
    #[test]
    fn test_menu_action_mapping() {
        use tray_icon::menu::MenuId;

        let ids = native::TrayMenuIds {
            show: MenuId::new("show"),
            quit: MenuId::new("quit"),
        };
        assert_eq!(ids.action_for(&MenuId::new("show")), Some(TrayAction::ShowWindow));
        assert_eq!(ids.action_for(&MenuId::new("quit")), Some(TrayAction::Exit));
        assert_eq!(ids.action_for(&MenuId::new("other")), None);
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    #[test]
    fn test_tray_unavailable() {
        assert!(TrayManager::new().is_err());
    }
}
