//! # 配置模块
//!
//! ## 设计思路
//!
//! 将归一化链路的“可调策略”集中到 `ImageConfig`：体积与像素上限用于尽早拒绝恶意输入，
//! 尺寸上限与质量决定传输体积。`Default` 即生产取值（1024px / 质量 90）。

use image::imageops::FilterType;

use super::ImageError;

/// 默认单边尺寸上限（像素）。
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;
/// 默认有损编码质量（1~100，对应 0.9）。
pub const DEFAULT_QUALITY: u8 = 90;

/// 图片归一化配置。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 输出图片单边最大值。fit 模式约束长边，crop 模式约束正方形边长。
    pub max_dimension: u32,
    /// 有损编码质量（1~100）。
    pub quality: u8,
    /// 缩放滤镜策略。
    pub resize_filter: FilterType,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_QUALITY,
            resize_filter: FilterType::Triangle,
        }
    }
}

impl ImageConfig {
    /// 校验取值范围，非法配置在构造处理器前被拒绝。
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.max_dimension == 0 {
            return Err(ImageError::InvalidFormat("max_dimension 不能为 0".to_string()));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ImageError::InvalidFormat(format!(
                "quality 必须在 1~100 之间：{}",
                self.quality
            )));
        }
        if self.max_file_size == 0 || self.max_decoded_pixels == 0 {
            return Err(ImageError::InvalidFormat("体积与像素上限必须大于 0".to_string()));
        }
        Ok(())
    }
}
