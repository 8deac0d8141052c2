//! # 传输编码模块
//!
//! ## 设计思路
//!
//! 首选有损 JPEG（质量 90），运行环境不支持时回退无损 PNG。
//! 是否支持在一次会话中不会变化，所以能力探测只在进程内执行一次，
//! 结果缓存在 `TRANSPORT_CODEC`，每次归一化直接按缓存分支。

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use once_cell::sync::Lazy;

use super::ImageError;

/// 传输编码格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportCodec {
    /// 有损 JPEG（首选）。
    Jpeg,
    /// 无损 PNG（回退）。
    Png,
}

impl TransportCodec {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// 按格式编码一张已栅格化的图片。
    pub(crate) fn encode(self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
        let mut out = Vec::new();
        match self {
            Self::Jpeg => {
                // JPEG 不支持 alpha 通道，先压平为 RGB
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                let encoder = JpegEncoder::new_with_quality(&mut out, quality);
                rgb.write_with_encoder(encoder)
                    .map_err(|e| ImageError::Encode(format!("JPEG 编码失败：{}", e)))?;
            }
            Self::Png => {
                let mut cursor = Cursor::new(&mut out);
                image
                    .write_to(&mut cursor, ImageFormat::Png)
                    .map_err(|e| ImageError::Encode(format!("PNG 编码失败：{}", e)))?;
            }
        }
        Ok(out)
    }
}

/// 进程级缓存的能力探测结果。
static TRANSPORT_CODEC: Lazy<TransportCodec> = Lazy::new(probe_transport_codec);

/// 读取缓存的传输编码格式（首次调用时触发探测）。
pub fn transport_codec() -> TransportCodec {
    *TRANSPORT_CODEC
}

/// 探测首选编码是否可用：编码一张 1x1 图片并确认能解回。
fn probe_transport_codec() -> TransportCodec {
    let probe = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, image::Rgb([128, 128, 128])));

    let supported = TransportCodec::Jpeg
        .encode(&probe, super::config::DEFAULT_QUALITY)
        .ok()
        .and_then(|bytes| image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).ok())
        .is_some();

    if supported {
        log::info!("🖼️ 传输编码探测完成：使用 JPEG");
        TransportCodec::Jpeg
    } else {
        log::warn!("⚠️ 当前环境不支持 JPEG 编码，回退 PNG");
        TransportCodec::Png
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    #[test]
    fn probe_prefers_jpeg_when_available() {
        assert_eq!(transport_codec(), TransportCodec::Jpeg);
        // 第二次读取走缓存，结果一致
        assert_eq!(transport_codec(), transport_codec());
    }

    #[test]
    fn encodes_rgba_source_in_both_codecs() {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_fn(16, 8, |x, y| {
            Rgba([(x * 10) as u8, (y * 20) as u8, 40, 200])
        }));

        let jpeg = TransportCodec::Jpeg.encode(&img, 90).expect("jpeg encode");
        assert_eq!(infer::get(&jpeg).map(|k| k.mime_type()), Some("image/jpeg"));

        let png = TransportCodec::Png.encode(&img, 90).expect("png encode");
        assert_eq!(infer::get(&png).map(|k| k.mime_type()), Some("image/png"));
        let decoded = image::load_from_memory(&png).expect("png decodes");
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }
}
