//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageNormalizer` 只负责流程编排，不关心调用方是谁。处理链路固定为：
//! 1. 异步加载原始字节（文件读取不阻塞调用方）
//! 2. 在阻塞线程池中解码、栅格化、编码
//! 3. 返回 `EncodedImage`
//!
//! 每个阶段只有一个挂起点；多个文件并发归一化时互不等待。
//!
//! ## 实现思路
//!
//! - 配置放在 `Arc` 中，克隆处理器只增加引用计数，可随任务移动。
//! - 传输格式在构造时从进程级缓存读取，之后不再探测。
//! - 记录 `load/encode/total` 阶段耗时，便于性能诊断。

use std::sync::Arc;
use std::time::Instant;

use super::codec::{self, TransportCodec};
use super::{EncodedImage, ImageConfig, ImageError, ImageSource};

/// 图片归一化处理器。
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    config: Arc<ImageConfig>,
    codec: TransportCodec,
}

impl ImageNormalizer {
    /// 根据配置创建处理器，传输格式取自缓存的能力探测结果。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use nightweb_client::image_handler::{ImageConfig, ImageNormalizer};
    ///
    /// let normalizer = ImageNormalizer::new(ImageConfig::default())?;
    /// # Ok::<(), nightweb_client::image_handler::ImageError>(())
    /// ```
    pub fn new(config: ImageConfig) -> Result<Self, ImageError> {
        Self::with_codec(config, codec::transport_codec())
    }

    /// 显式指定传输格式，主要用于测试回退路径。
    pub fn with_codec(config: ImageConfig, codec: TransportCodec) -> Result<Self, ImageError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            codec,
        })
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    pub fn codec(&self) -> TransportCodec {
        self.codec
    }

    /// 归一化主入口。
    ///
    /// `crop_to_square` 为 `true` 时输出居中裁剪的正方形（头像），
    /// 否则等比缩放到长边不超过上限（帖子配图）。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use nightweb_client::image_handler::{ImageConfig, ImageNormalizer, ImageSource};
    ///
    /// # async fn demo() -> Result<(), nightweb_client::image_handler::ImageError> {
    /// let normalizer = ImageNormalizer::new(ImageConfig::default())?;
    /// let image = normalizer
    ///     .normalize(ImageSource::FilePath("/tmp/avatar.png".into()), true)
    ///     .await?;
    /// println!("{}", image.to_data_uri());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn normalize(
        &self,
        source: ImageSource,
        crop_to_square: bool,
    ) -> Result<EncodedImage, ImageError> {
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = Self::load_source(source, &self.config).await?;
        let load_elapsed = load_start.elapsed();

        let encode_start = Instant::now();
        let config = Arc::clone(&self.config);
        let codec = self.codec;
        let encoded = tokio::task::spawn_blocking(move || {
            Self::decode_and_encode(raw, crop_to_square, &config, codec)
        })
        .await
        .map_err(|e| ImageError::Decode(format!("解码任务异常退出：{}", e)))??;
        let encode_elapsed = encode_start.elapsed();

        log::debug!(
            "⏱️ 图片归一化耗时 - load={}ms decode+encode={}ms total={}ms",
            load_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(encoded)
    }
}
