//! Shutclock - 定时关机小工具
//!
//! 选择一个时刻，到点后关闭计算机。窗口可以隐藏到系统托盘。

mod app;
mod core;
mod ui;
mod utils;

/// 应用程序入口点
///
/// iced 自带 tokio 执行器，这里不再套一层运行时
fn main() -> anyhow::Result<()> {
    let app = app::App::new()?;
    app.run()
}
