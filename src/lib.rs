//! # nightweb 客户端 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │             宿主 (webview / 终端 / 测试替身)              │
//! │                                                          │
//! │   链接点击 ── 文件选择 ── 表单提交        UiHost trait   │
//! └───────┼────────────┼───────────┼─────────────────────────┘
//!         ↓            ↓           ↓
//! ┌───────┼────────────┼───────────┼─────────────────────────┐
//! │       ↓            ↓           ↓       客户端核心 (Rust)  │
//! │  query::Command  image_handler  session::ClientSession   │
//! │       │          (解码·缩放·编码)   ├─ AttachmentBatch     │
//! │       ↓                 │          ├─ 头像槽位            │
//! │  router::ActionRouter ──┴────────▶ └─ ComposeState       │
//! │       │                                   │              │
//! │       └──────────────▶ gateway::RequestGateway ◀─────────┘
//! │                        ├─ RequestLifecycle (RAII 计数)    │
//! │                        └─ Transport (reqwest 表单 POST)   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`config`] | 客户端 JSON 配置，缺失时回退默认值 |
//! | [`query`] | 扁平 `key=value&…` 命令串编解码 |
//! | [`router`] | 命令 → 对话框 / 请求 / 跳转 |
//! | [`image_handler`] | 图片加载、等比缩放或居中裁剪、传输编码 |
//! | [`attachments`] | 并发归一化结果按完成顺序汇入批次 |
//! | [`gateway`] | 统一请求通道与在途请求计数 |
//! | [`session`] | 会话状态：批次、头像、发帖状态机 |

pub mod error;
pub mod config;
pub mod query;
pub mod image_handler;
pub mod attachments;
pub mod gateway;
pub mod router;
pub mod session;

#[cfg(test)]
mod test_support;

pub use error::AppError;
