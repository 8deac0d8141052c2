//! # 尺寸规划模块
//!
//! 纯函数：输入原图尺寸与策略，输出目标尺寸、采样区域与画布偏移。
//! 不接触像素，便于单独测试。所有除法一律向下取整。

use super::ImageError;

/// 原图中被采样的矩形区域（源坐标系）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// 一次栅格化的完整规划。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub source_width: u32,
    pub source_height: u32,
    pub target_width: u32,
    pub target_height: u32,
    /// 画布坐标系下的绘制偏移（居中裁剪时为负值，否则为 0）。
    pub offset_x: i64,
    pub offset_y: i64,
    pub region: SourceRegion,
}

impl ResizePlan {
    /// 计算规划。
    ///
    /// - `crop_to_square = true`：边长 `min(W, H, max)`，居中裁剪正方形
    /// - `crop_to_square = false`：等比缩放，长边不超过 `max`
    pub fn compute(
        width: u32,
        height: u32,
        crop_to_square: bool,
        max_dimension: u32,
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::Decode(format!("图片尺寸无效：{}x{}", width, height)));
        }
        if max_dimension == 0 {
            return Err(ImageError::InvalidFormat("max_dimension 不能为 0".to_string()));
        }

        if crop_to_square {
            Ok(Self::square_crop(width, height, max_dimension))
        } else {
            Ok(Self::fit(width, height, max_dimension))
        }
    }

    fn square_crop(width: u32, height: u32, max_dimension: u32) -> Self {
        let shorter = width.min(height);
        let side = shorter.min(max_dimension);

        // 原图按短边缩放到 side 后的尺寸
        let scaled_w = scale_floor(width, side, shorter);
        let scaled_h = scale_floor(height, side, shorter);

        let offset_x = if scaled_w > scaled_h {
            -(((scaled_w - scaled_h) / 2) as i64)
        } else {
            0
        };
        let offset_y = if scaled_h > scaled_w {
            -(((scaled_h - scaled_w) / 2) as i64)
        } else {
            0
        };

        Self {
            source_width: width,
            source_height: height,
            target_width: side,
            target_height: side,
            offset_x,
            offset_y,
            region: SourceRegion {
                left: (width - shorter) / 2,
                top: (height - shorter) / 2,
                width: shorter,
                height: shorter,
            },
        }
    }

    fn fit(width: u32, height: u32, max_dimension: u32) -> Self {
        let longer = width.max(height);
        let (target_width, target_height) = if longer <= max_dimension {
            (width, height)
        } else {
            (
                scale_floor(width, max_dimension, longer).max(1),
                scale_floor(height, max_dimension, longer).max(1),
            )
        };

        Self {
            source_width: width,
            source_height: height,
            target_width,
            target_height,
            offset_x: 0,
            offset_y: 0,
            region: SourceRegion {
                left: 0,
                top: 0,
                width,
                height,
            },
        }
    }

    /// 目标与原图完全一致，无需重采样。
    pub fn is_identity(&self) -> bool {
        self.target_width == self.source_width
            && self.target_height == self.source_height
            && self.region.width == self.source_width
            && self.region.height == self.source_height
    }
}

/// `value * numerator / denominator`，向下取整，u64 中间值避免溢出。
fn scale_floor(value: u32, numerator: u32, denominator: u32) -> u32 {
    ((value as u64 * numerator as u64) / denominator as u64) as u32
}
