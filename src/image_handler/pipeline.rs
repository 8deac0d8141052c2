//! # 解码与栅格化流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → 目标画布 → 传输编码”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 读取 header 尺寸，按像素/内存上限快速拒绝
//! 2. 完整解码
//! 3. `ResizePlan` 计算目标尺寸与采样区域
//! 4. `fast_image_resize` 裁剪 + 缩放（失败回退 `image` 自带实现）
//! 5. 按缓存的传输格式编码
//!
//! 整个函数是同步 CPU 密集型操作，由 `handler` 放到阻塞线程池执行。

use bytes::Bytes;
use fast_image_resize as fr;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba};
use std::io::Cursor;

use super::codec::TransportCodec;
use super::geometry::ResizePlan;
use super::source::{EncodedImage, RawImageData};
use super::{ImageConfig, ImageError, ImageNormalizer};

impl ImageNormalizer {
    /// 解码、栅格化并编码。
    pub(super) fn decode_and_encode(
        raw: RawImageData,
        crop_to_square: bool,
        config: &ImageConfig,
        codec: TransportCodec,
    ) -> Result<EncodedImage, ImageError> {
        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(&raw.bytes)
            .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

        let (raw_width, raw_height) = decoded.dimensions();
        Self::validate_pixel_limits(config, raw_width, raw_height)?;

        let plan = ResizePlan::compute(raw_width, raw_height, crop_to_square, config.max_dimension)?;
        let rasterized = Self::rasterize(decoded, &plan, config.resize_filter)?;
        let (width, height) = rasterized.dimensions();

        let encoded = codec.encode(&rasterized, config.quality)?;

        log::info!(
            "✅ 图片归一化成功 - 来源: {} 原始尺寸: {}x{} 输出尺寸: {}x{} 模式: {} 编码: {} {}KB",
            raw.source_hint,
            raw_width,
            raw_height,
            width,
            height,
            if crop_to_square { "crop" } else { "fit" },
            codec.as_str(),
            encoded.len() / 1024
        );

        Ok(EncodedImage::new(codec, width, height, Bytes::from(encoded)))
    }

    /// 仅通过内存中的图片头信息读取宽高。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    fn validate_pixel_limits(config: &ImageConfig, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &ImageConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ImageError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 按规划把采样区域绘制到目标画布。
    fn rasterize(
        image: DynamicImage,
        plan: &ResizePlan,
        filter: image::imageops::FilterType,
    ) -> Result<DynamicImage, ImageError> {
        if plan.is_identity() {
            return Ok(image);
        }

        match Self::resize_with_fast_image_resize(&image, plan, filter) {
            Ok(resized) => Ok(resized),
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 栅格化失败，回退 image::resize_exact：{}", err);
                let region = plan.region;
                Ok(image
                    .crop_imm(region.left, region.top, region.width, region.height)
                    .resize_exact(plan.target_width, plan.target_height, filter))
            }
        }
    }

    fn resize_with_fast_image_resize(
        image: &DynamicImage,
        plan: &ResizePlan,
        filter: image::imageops::FilterType,
    ) -> Result<DynamicImage, ImageError> {
        let src = image.to_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| ImageError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image =
            fr::images::Image::new(plan.target_width, plan.target_height, fr::PixelType::U8x4);

        let region = plan.region;
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)))
            .crop(
                region.left as f64,
                region.top as f64,
                region.width as f64,
                region.height as f64,
            );

        let mut resizer = fr::Resizer::new();
        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ImageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
            plan.target_width,
            plan.target_height,
            dst_image.into_vec(),
        )
        .ok_or_else(|| ImageError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))?;

        Ok(DynamicImage::ImageRgba8(rgba))
    }

    fn to_fast_filter(filter: image::imageops::FilterType) -> fr::FilterType {
        match filter {
            image::imageops::FilterType::Nearest => fr::FilterType::Box,
            image::imageops::FilterType::Triangle => fr::FilterType::Bilinear,
            image::imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
            image::imageops::FilterType::Gaussian => fr::FilterType::Mitchell,
            image::imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}
