//! UI管理器模块
//!
//! 使用iced实现时间选择窗口，并在界面事件循环上每秒检查一次关机时间

use chrono::{DateTime, Local};
use iced::widget::{button, column, container, pick_list, row, text};
use iced::{
    event, executor, keyboard, time, window, Alignment, Application, Command, Element, Event,
    Font, Length, Settings, Subscription, Theme,
};
use log::{error, info, warn};
use std::fmt;
use std::time::Duration;

use crate::core::schedule::ScheduledShutdown;
use crate::core::shutdown::PowerController;
use crate::core::types::{TickOutcome, TimeOfDay};
use crate::ui::tray::{TrayAction, TrayManager};
use crate::utils::notification;

/// 关机时间检查间隔
const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// 托盘事件检查间隔
const TRAY_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 下拉框中的两位数字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoDigit(pub u32);

impl fmt::Display for TwoDigit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// 应用程序消息
#[derive(Debug, Clone)]
pub enum Message {
    /// 选择小时
    HourSelected(TwoDigit),
    /// 选择分钟
    MinuteSelected(TwoDigit),
    /// 确认设置（按钮或回车）
    Commit,
    /// 每秒检查一次
    Tick,
    /// 检查托盘事件
    PollTray,
    /// 点击窗口关闭按钮
    CloseRequested,
}

/// 点击关闭按钮后的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseAction {
    /// 隐藏窗口，只保留托盘图标
    HideToTray,
    /// 没有托盘时最小化窗口，保持等待
    Minimize,
    /// 退出程序
    Exit,
}

/// 启动参数
pub struct UIFlags {
    /// 关机控制器
    pub power: Box<dyn PowerController + Send>,
    /// 关闭窗口时是否隐藏到托盘
    pub minimize_to_tray: bool,
    /// 隐藏窗口时是否弹出桌面通知
    pub show_notifications: bool,
}

/// 主窗口状态
pub struct UIManager {
    hour: TwoDigit,
    minute: TwoDigit,
    hour_options: Vec<TwoDigit>,
    minute_options: Vec<TwoDigit>,
    /// 唯一的定时关机任务
    schedule: ScheduledShutdown,
    status_text: String,
    power: Box<dyn PowerController + Send>,
    tray: Option<TrayManager>,
    minimize_to_tray: bool,
    show_notifications: bool,
}

impl UIManager {
    /// 以给定的当前时间作为默认选择创建窗口状态
    fn with_parts(flags: UIFlags, tray: Option<TrayManager>, now: DateTime<Local>) -> Self {
        let default_time = TimeOfDay::from_time(&now);
        let schedule = ScheduledShutdown::new();
        let status_text = schedule.status_text(now);

        Self {
            hour: TwoDigit(default_time.hour()),
            minute: TwoDigit(default_time.minute()),
            hour_options: (0..24).map(TwoDigit).collect(),
            minute_options: (0..60).map(TwoDigit).collect(),
            schedule,
            status_text,
            power: flags.power,
            tray,
            minimize_to_tray: flags.minimize_to_tray,
            show_notifications: flags.show_notifications,
        }
    }

    /// 处理消息，`now` 为当前时间
    fn handle_message(&mut self, message: Message, now: DateTime<Local>) -> Command<Message> {
        match message {
            Message::HourSelected(hour) => {
                if self.schedule.target().is_none() {
                    self.hour = hour;
                }
                Command::none()
            },
            Message::MinuteSelected(minute) => {
                if self.schedule.target().is_none() {
                    self.minute = minute;
                }
                Command::none()
            },
            Message::Commit => {
                self.commit(now);
                Command::none()
            },
            Message::Tick => {
                if self.schedule.tick(now, self.power.as_ref()) == TickOutcome::Fired {
                    info!("状态: {}", self.schedule.state());
                }
                self.refresh_status(now);
                Command::none()
            },
            Message::PollTray => {
                let actions = match &self.tray {
                    Some(tray) => tray.poll_actions(),
                    None => Vec::new(),
                };
                Command::batch(actions.into_iter().map(|action| self.handle_tray_action(action)))
            },
            Message::CloseRequested => match self.close_action() {
                CloseAction::HideToTray => {
                    info!("程序已最小化到托盘");
                    self.notify(notification::HIDDEN_TO_TRAY);
                    window::change_mode(window::Id::MAIN, window::Mode::Hidden)
                },
                CloseAction::Minimize => {
                    info!("没有托盘图标，最小化窗口并继续等待关机");
                    self.notify(notification::MINIMIZED_WHILE_ARMED);
                    window::minimize(window::Id::MAIN, true)
                },
                CloseAction::Exit => {
                    info!("关闭窗口，退出程序");
                    window::close(window::Id::MAIN)
                },
            },
        }
    }

    /// 决定关闭按钮的效果
    ///
    /// 等待关机期间关闭窗口不会退出程序，否则定时任务会随进程一起消失。
    fn close_action(&self) -> CloseAction {
        match (self.tray.is_some(), self.schedule.is_armed()) {
            (true, true) => CloseAction::HideToTray,
            (true, false) if self.minimize_to_tray => CloseAction::HideToTray,
            (false, true) => CloseAction::Minimize,
            _ => CloseAction::Exit,
        }
    }

    fn notify(&self, body: &str) {
        if self.show_notifications {
            notification::show(body);
        }
    }

    /// 确认选择的时间并开始等待
    fn commit(&mut self, now: DateTime<Local>) {
        let at = match TimeOfDay::new(self.hour.0, self.minute.0) {
            Ok(at) => at,
            Err(e) => {
                error!("{}", e);
                return;
            },
        };

        match self.schedule.arm(now, at) {
            Ok(_) => info!("状态: {}, 关机方式: {}", self.schedule.state(), self.power.describe()),
            Err(e) => warn!("忽略设置请求: {}", e),
        }
        self.refresh_status(now);
    }

    fn handle_tray_action(&self, action: TrayAction) -> Command<Message> {
        match action {
            TrayAction::ShowWindow => {
                info!("从托盘恢复窗口");
                Command::batch(vec![
                    window::change_mode(window::Id::MAIN, window::Mode::Windowed),
                    window::gain_focus(window::Id::MAIN),
                ])
            },
            TrayAction::Exit => {
                info!("从托盘退出程序");
                window::close(window::Id::MAIN)
            },
        }
    }

    fn refresh_status(&mut self, now: DateTime<Local>) {
        self.status_text = self.schedule.status_text(now);
        if let Some(tray) = &self.tray {
            tray.set_status(&self.status_text);
        }
    }

    fn is_selecting(&self) -> bool {
        self.schedule.target().is_none()
    }
}

/// 运行窗口程序
pub fn run(flags: UIFlags, window_size: (f32, f32)) -> iced::Result {
    let settings = Settings {
        window: window::Settings {
            size: iced::Size::new(window_size.0, window_size.1),
            position: window::Position::Centered,
            resizable: false,
            // 关闭请求统一由 CloseRequested 处理
            exit_on_close_request: false,
            ..Default::default()
        },
        default_font: Font::with_name("Microsoft YaHei"),
        ..Settings::with_flags(flags)
    };
    UIManager::run(settings)
}

impl Application for UIManager {
    type Message = Message;
    type Theme = Theme;
    type Executor = executor::Default;
    type Flags = UIFlags;

    fn new(flags: Self::Flags) -> (Self, Command<Self::Message>) {
        let tray = match TrayManager::new() {
            Ok(tray) => Some(tray),
            Err(e) => {
                warn!("创建托盘图标失败，关闭窗口将最小化或退出: {:#}", e);
                None
            },
        };

        (Self::with_parts(flags, tray, Local::now()), Command::none())
    }

    fn title(&self) -> String {
        "定时关机".to_string()
    }

    fn update(&mut self, message: Self::Message) -> Command<Self::Message> {
        self.handle_message(message, Local::now())
    }

    fn subscription(&self) -> Subscription<Self::Message> {
        let mut subscriptions = vec![event::listen_with(|event, _status| match event {
            Event::Window(_, window::Event::CloseRequested) => Some(Message::CloseRequested),
            _ => None,
        })];

        if self.is_selecting() {
            subscriptions.push(keyboard::on_key_press(|key, _modifiers| match key {
                keyboard::Key::Named(keyboard::key::Named::Enter) => Some(Message::Commit),
                _ => None,
            }));
        }

        // 触发后不再检查
        if self.schedule.is_armed() {
            subscriptions.push(time::every(POLL_INTERVAL).map(|_| Message::Tick));
        }

        if self.tray.is_some() {
            subscriptions.push(time::every(TRAY_POLL_INTERVAL).map(|_| Message::PollTray));
        }

        Subscription::batch(subscriptions)
    }

    fn view(&self) -> Element<Self::Message> {
        let selectors: Element<Self::Message> = if self.is_selecting() {
            row![
                pick_list(&self.hour_options[..], Some(self.hour), Message::HourSelected)
                    .width(Length::Fixed(70.0)),
                text(" 时 "),
                pick_list(&self.minute_options[..], Some(self.minute), Message::MinuteSelected)
                    .width(Length::Fixed(70.0)),
                text(" 分 "),
            ]
            .align_items(Alignment::Center)
            .into()
        } else {
            row![
                text(self.hour.to_string()),
                text(" 时 "),
                text(self.minute.to_string()),
                text(" 分 "),
            ]
            .align_items(Alignment::Center)
            .into()
        };

        let set_button = button("设置定时关机").padding(8);
        let set_button = if self.is_selecting() {
            set_button.on_press(Message::Commit)
        } else {
            set_button
        };

        let content = column![text(&self.status_text).size(14), selectors, set_button]
            .spacing(10)
            .padding(15)
            .align_items(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .into()
    }

    fn theme(&self) -> Self::Theme {
        Theme::Light
    }
}
