//! # 客户端配置
//!
//! JSON 文件，字段缺失时取默认值；文件不存在或内容损坏时整体回退默认配置，
//! 只记录警告，不阻止启动。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::gateway::EndpointPaths;
use crate::image_handler::{DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY, ImageConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub general_endpoint: String,
    pub short_endpoint: String,
    pub max_image_dimension: u32,
    pub image_quality: u8,
    pub max_file_size: u64,
    pub max_decoded_pixels: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let paths = EndpointPaths::default();
        let image = ImageConfig::default();
        Self {
            server_url: "http://127.0.0.1:4707".to_string(),
            general_endpoint: paths.general,
            short_endpoint: paths.short,
            max_image_dimension: DEFAULT_MAX_DIMENSION,
            image_quality: DEFAULT_QUALITY,
            max_file_size: image.max_file_size,
            max_decoded_pixels: image.max_decoded_pixels,
        }
    }
}

impl ClientConfig {
    pub fn load_from_path(config_path: &Path) -> Self {
        if !config_path.exists() {
            log::info!("配置文件不存在，使用默认配置: {}", config_path.display());
            return Self::default();
        }

        match fs::read_to_string(config_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("⚠️ 配置文件解析失败，使用默认配置: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("⚠️ 读取配置文件失败，使用默认配置: {}", e);
                Self::default()
            }
        }
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("序列化配置失败: {}", e)))?;
        fs::write(config_path, content)?;
        Ok(())
    }

    pub fn endpoint_paths(&self) -> EndpointPaths {
        EndpointPaths {
            general: self.general_endpoint.clone(),
            short: self.short_endpoint.clone(),
        }
    }

    /// 派生归一化配置，取值越界时报配置错误。
    pub fn image_config(&self) -> Result<ImageConfig, AppError> {
        let config = ImageConfig {
            max_file_size: self.max_file_size,
            max_decoded_pixels: self.max_decoded_pixels,
            // 按 RGBA 每像素 4 字节估算，与像素上限同步放宽
            max_decoded_bytes: self.max_decoded_pixels.saturating_mul(4),
            max_dimension: self.max_image_dimension,
            quality: self.image_quality,
            ..ImageConfig::default()
        };
        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        Ok(config)
    }
}
