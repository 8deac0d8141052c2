//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 各子模块各自定义细粒度错误（`QueryError` / `ImageError` / `GatewayError`），
//! 会话层与宿主入口统一返回 `Result<T, AppError>`，避免在调用链上反复
//! `.map_err(|e| e.to_string())`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息，子模块错误通过 `#[from]` 自动转换。
//! - 实现 `Serialize` 将错误序列化为字符串，宿主（webview IPC / 终端）可直接返回。

use serde::Serialize;

use crate::gateway::GatewayError;
use crate::image_handler::ImageError;
use crate::query::QueryError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 命令串缺少路由字段
    #[error("{0}")]
    Query(#[from] QueryError),

    /// 图片归一化流水线错误（读取 / 解码 / 编码）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 请求通道错误
    #[error("{0}")]
    Gateway(#[from] GatewayError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置非法或无法读写
    #[error("配置错误: {0}")]
    Config(String),

    /// 当前状态下不允许的操作（例如重复提交）
    #[error("状态错误: {0}")]
    InvalidState(String),
}

/// 宿主 IPC 要求返回值实现 `Serialize`。
/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
