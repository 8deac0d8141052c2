//! # 命令路由模块（ActionRouter）
//!
//! ## 设计思路
//!
//! 界面上的每个可点击元素都携带一条编码后的命令串。路由器把命令的 `type`
//! 解析为类型化的 `Action`，四类结果互斥：
//!
//! | 类别 | 命令类型 | 行为 |
//! |------|----------|------|
//! | 对话框 | new-post / edit-post / profile / import-user / export-user / search / link | 准备状态后打开模态框 |
//! | 请求 | toggle-fav / switch-user / delete-user / create-user / delete-post / check-user-* | 经请求通道发出，按响应更新界面 |
//! | 跳转 | user / post / tag / search-results / fav / fav-users / fav-posts | `<端点>?<命令串>` |
//! | 未知 | 其余 | 静默忽略 |
//!
//! ## 实现思路
//!
//! - 确认提示由调用方提供；用户拒绝时路由器不产生任何副作用。
//! - 宿主界面通过 `UiHost` trait 注入，测试中替换为记录型实现。
//! - 分发结果以 `DispatchOutcome` 返回，调用方可以忽略。

mod action;
mod dispatch;
mod host;

pub use action::Action;
pub use dispatch::{ActionRouter, DispatchOutcome};
pub use host::{Dialog, UiHost};
