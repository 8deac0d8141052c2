//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `ImageSource` 表示用户选择的图片来源
//! - `RawImageData` 表示已加载但未解码的字节
//! - `EncodedImage` 表示归一化完成、可直接随表单提交的编码结果

use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;

use super::codec::TransportCodec;

/// 图片输入来源。
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// 文件选择器给出的本地路径。
    FilePath(PathBuf),
    /// 已读入内存的原始字节。
    Bytes(Bytes),
    /// Data URI（`data:image/...;base64,`）或纯 Base64 字符串。
    DataUri(String),
}

impl ImageSource {
    /// 日志用的简短来源描述。
    pub(crate) fn hint(&self) -> &'static str {
        match self {
            Self::FilePath(_) => "file",
            Self::Bytes(_) => "bytes",
            Self::DataUri(_) => "data-uri",
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::FilePath(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Bytes,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// 归一化结果：已编码的传输图片。
///
/// 内部字节为 `Bytes`，批次快照时克隆开销只是引用计数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    codec: TransportCodec,
    width: u32,
    height: u32,
    data: Bytes,
}

impl EncodedImage {
    pub(crate) fn new(codec: TransportCodec, width: u32, height: u32, data: Bytes) -> Self {
        Self {
            codec,
            width,
            height,
            data,
        }
    }

    pub fn codec(&self) -> TransportCodec {
        self.codec
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mime_type(&self) -> &'static str {
        self.codec.mime_type()
    }

    /// 编码后的字节。
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 生成 `data:<mime>;base64,<payload>` 形式的传输串。
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            general_purpose::STANDARD.encode(&self.data)
        )
    }
}
