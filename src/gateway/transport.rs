//! # 传输层
//!
//! ## 设计思路
//!
//! `Transport` 是请求通道与网络之间的接缝：生产环境用 `HttpTransport`（reqwest），
//! 测试中用脚本化实现替换，网关本身不关心请求如何送达。
//!
//! ## 实现思路
//!
//! - 两个逻辑端点：通用端点 `/` 与短别名端点 `/c`，路径来自配置。
//! - 请求体按表单编码（`application/x-www-form-urlencoded`）。
//! - 不设置请求超时、不重试：请求会一直等待网络结果。

use std::future::Future;

use crate::query::QueryMap;

use super::GatewayError;

/// 逻辑端点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// 通用端点（`/`）。
    General,
    /// 收藏/列表类只读动作的短别名端点（`/c`）。
    Short,
}

/// 两个逻辑端点对应的路径。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPaths {
    pub general: String,
    pub short: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            general: "/".to_string(),
            short: "/c".to_string(),
        }
    }
}

impl EndpointPaths {
    pub fn path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::General => &self.general,
            Endpoint::Short => &self.short,
        }
    }
}

/// 请求发送接口。
pub trait Transport: Send + Sync {
    /// 向指定端点发送一次请求，返回服务器原始响应串。
    fn post(
        &self,
        endpoint: Endpoint,
        body: &QueryMap,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

/// 基于 `reqwest` 的 HTTP 传输。
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    server_url: reqwest::Url,
    paths: EndpointPaths,
}

impl HttpTransport {
    pub fn new(server_url: &str, paths: EndpointPaths) -> Result<Self, GatewayError> {
        let server_url = reqwest::Url::parse(server_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}：{}", server_url, e)))?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| GatewayError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self {
            client,
            server_url,
            paths,
        })
    }

    /// 解析端点的完整地址。
    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<reqwest::Url, GatewayError> {
        let path = self.paths.path(endpoint);
        self.server_url
            .join(path)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}：{}", path, e)))
    }
}

impl Transport for HttpTransport {
    async fn post(&self, endpoint: Endpoint, body: &QueryMap) -> Result<String, GatewayError> {
        let url = self.endpoint_url(endpoint)?;
        log::debug!("📡 POST {} type={}", url, body.get("type").unwrap_or_default());

        let response = self
            .client
            .post(url)
            .form(body.pairs())
            .send()
            .await
            .map_err(|e| GatewayError::Network(format!("请求发送失败：{}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| GatewayError::Network(format!("读取响应失败：{}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_resolve_against_server() {
        let transport = HttpTransport::new("http://127.0.0.1:4707", EndpointPaths::default())
            .expect("transport init");

        assert_eq!(
            transport.endpoint_url(Endpoint::General).expect("general").as_str(),
            "http://127.0.0.1:4707/"
        );
        assert_eq!(
            transport.endpoint_url(Endpoint::Short).expect("short").as_str(),
            "http://127.0.0.1:4707/c"
        );
    }

    #[test]
    fn invalid_server_url_is_rejected() {
        assert!(matches!(
            HttpTransport::new("not a url", EndpointPaths::default()),
            Err(GatewayError::InvalidUrl(_))
        ));
    }
}
