//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载归一化链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配；
//! `code()` / `stage()` 提供稳定的机器可读标识，供宿主界面展示或统计。

/// 图片归一化统一错误类型。
///
/// 该类型会在 crate 层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

impl ImageError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "E_DECODE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::Encode(_) => "E_ENCODE",
            Self::FileSystem(_) => "E_FILE",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
        }
    }

    /// 出错所在阶段：`load` / `decode` / `encode`。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileSystem(_) | Self::InvalidFormat(_) => "load",
            Self::Decode(_) | Self::ResourceLimit(_) => "decode",
            Self::Encode(_) => "encode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_stages_are_stable() {
        let err = ImageError::Decode("bad".into());
        assert_eq!(err.code(), "E_DECODE");
        assert_eq!(err.stage(), "decode");

        let err = ImageError::FileSystem("missing".into());
        assert_eq!(err.code(), "E_FILE");
        assert_eq!(err.stage(), "load");

        assert_eq!(ImageError::Encode("x".into()).stage(), "encode");
    }
}
