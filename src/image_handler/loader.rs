//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（本地文件 / 内存字节 / Data URI）的原始字节加载，
//! 并在“尽可能早”的阶段执行输入校验：体积上限、文件签名。
//! 目标是尽快失败，减少不必要的解码开销。
//!
//! ## 实现思路
//!
//! - 文件：metadata 体积限制 + 异步读取（不阻塞调用方）。
//! - Data URI：格式解析 + 按 Base64 长度预估解码体积，超限直接拒绝。
//! - 最后统一用 `infer` 校验魔数，确保确实是图片。

use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;

use super::source::RawImageData;
use super::{ImageConfig, ImageError, ImageNormalizer, ImageSource};

impl ImageNormalizer {
    /// 按来源加载原始字节。
    pub(super) async fn load_source(
        source: ImageSource,
        config: &ImageConfig,
    ) -> Result<RawImageData, ImageError> {
        let source_hint = source.hint();
        let bytes = match source {
            ImageSource::FilePath(path) => Self::load_from_file(&path, config).await?,
            ImageSource::Bytes(bytes) => {
                Self::ensure_within_size(bytes.len() as u64, config.max_file_size, "图片数据")?;
                bytes
            }
            ImageSource::DataUri(data) => {
                Bytes::from(Self::parse_base64_with_limit(&data, config.max_file_size)?)
            }
        };

        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData { bytes, source_hint })
    }

    async fn load_from_file(path: &Path, config: &ImageConfig) -> Result<Bytes, ImageError> {
        log::debug!("📁 读取本地图片 - 路径: {}", path.display());

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ImageError::FileSystem(format!("无法读取文件信息 {}：{}", path.display(), e)))?;

        if !metadata.is_file() {
            return Err(ImageError::FileSystem(format!("不是文件：{}", path.display())));
        }
        Self::ensure_within_size(metadata.len(), config.max_file_size, "文件")?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ImageError::FileSystem(format!("无法读取图片文件：{}", e)))?;

        Ok(Bytes::from(bytes))
    }

    fn ensure_within_size(len: u64, limit: u64, what: &str) -> Result<(), ImageError> {
        if len > limit {
            return Err(ImageError::ResourceLimit(format!(
                "{}过大：{:.2} MB（限制：{:.2} MB）",
                what,
                len as f64 / 1024.0 / 1024.0,
                limit as f64 / 1024.0 / 1024.0
            )));
        }
        Ok(())
    }

    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, ImageError> {
        let len = base64_data.trim().len() as u64;
        let groups = len
            .checked_add(3)
            .ok_or_else(|| ImageError::ResourceLimit("Base64 输入长度溢出".to_string()))?
            / 4;

        groups
            .checked_mul(3)
            .ok_or_else(|| ImageError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
    }

    /// 解析 Data URI 或纯 Base64，解码前先按长度预估体积。
    pub(super) fn parse_base64_with_limit(data: &str, max_file_size: u64) -> Result<Vec<u8>, ImageError> {
        let normalized = data.trim();

        let payload = if normalized.starts_with("data:") {
            let base64_start = normalized
                .find(";base64,")
                .ok_or_else(|| ImageError::InvalidFormat("缺少 base64 标记".to_string()))?;
            &normalized[base64_start + 8..]
        } else {
            normalized
        };

        let estimated_len = Self::estimate_base64_decoded_upper_bound_len(payload)?;
        if estimated_len > max_file_size {
            return Err(ImageError::ResourceLimit(format!(
                "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ImageError::Decode(format!("Base64 解码失败：{}", e)))
    }

    fn validate_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::InvalidFormat("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| ImageError::InvalidFormat("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(ImageError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }
}
