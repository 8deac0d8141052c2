//! # 图片归一化模块（image_handler）
//!
//! ## 设计思路
//!
//! 把用户选择的任意图片变成“可随表单提交”的受限编码图片：
//! 单边不超过 1024px，首选 JPEG（质量 90），不支持时回退 PNG。
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `handler`：编排整条处理流水线（异步，解码放到阻塞线程池）
//! - `loader`：负责文件/字节/Data URI 加载与安全校验
//! - `geometry`：纯函数尺寸规划（fit / 居中裁剪）
//! - `pipeline`：负责解码、像素限制、栅格化
//! - `codec`：传输格式能力探测（进程内一次）与编码
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 文件选择器 / 头像输入
//!    ↓
//! handler.rs::normalize
//!    ├─ loader.rs（来源加载 + 体积/签名校验）
//!    ├─ pipeline.rs（解码 + 像素限制）
//!    │     └─ geometry.rs（目标尺寸与采样区域）
//!    └─ codec.rs（JPEG / PNG 编码）
//!    ↓
//! EncodedImage → AttachmentBatch 或头像字段
//! ```

mod codec;
mod config;
mod error;
mod geometry;
mod handler;
mod loader;
mod pipeline;
mod source;

pub use codec::{TransportCodec, transport_codec};
pub use config::{DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY, ImageConfig};
pub use error::ImageError;
pub use geometry::{ResizePlan, SourceRegion};
pub use handler::ImageNormalizer;
pub use source::{EncodedImage, ImageSource};
