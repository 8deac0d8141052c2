//! # 请求通道模块（RequestGateway）
//!
//! ## 设计思路
//!
//! 所有后端操作（资料保存、发帖/编辑/删除、用户切换/创建/删除、导入导出、收藏）
//! 都经由同一个网关发出。网关只负责三件事：
//! 1. 把 `Operation` 变成请求体并交给 `Transport`
//! 2. 在请求在途期间维持生命周期计数（忙碌指示）
//! 3. 原样返回服务器响应串，由调用方按 `ResponseAction` 解释
//!
//! 不重试、不超时；失败只以 `Err` 形式返回给调用方。
//!
//! ## 调用链
//!
//! ```text
//! router / session
//!    ↓ Operation
//! RequestGateway::submit ── InFlightGuard（计数 +1 … Drop 时 -1）
//!    ↓ QueryMap
//! Transport::post（HttpTransport = reqwest 表单 POST）
//!    ↓ String
//! Operation::response_action → ResponseAction
//! ```

mod error;
mod lifecycle;
mod operation;
mod response;
mod transport;

pub use error::GatewayError;
pub use lifecycle::{InFlightGuard, RequestLifecycle};
pub use operation::{OPERATION_NAMES, Operation};
pub use response::ResponseAction;
pub use transport::{Endpoint, EndpointPaths, HttpTransport, Transport};

use crate::query::QueryMap;

/// 统一请求通道。
pub struct RequestGateway<T> {
    transport: T,
    lifecycle: RequestLifecycle,
}

impl<T: Transport> RequestGateway<T> {
    pub fn new(transport: T) -> Self {
        Self::with_lifecycle(transport, RequestLifecycle::new())
    }

    /// 与其他组件共享同一个生命周期计数器。
    pub fn with_lifecycle(transport: T, lifecycle: RequestLifecycle) -> Self {
        Self {
            transport,
            lifecycle,
        }
    }

    pub fn lifecycle(&self) -> &RequestLifecycle {
        &self.lifecycle
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 发出一次操作。
    ///
    /// 发出时计数加一，结束时（成功、失败或 future 被丢弃）计数减一。
    pub async fn submit(&self, operation: &Operation) -> Result<String, GatewayError> {
        let _in_flight = self.lifecycle.begin();
        let payload = operation.to_payload();

        log::info!("📤 发出请求 - type={} endpoint={:?}", operation.name(), operation.endpoint());
        let result = self.transport.post(operation.endpoint(), &payload).await;

        match &result {
            Ok(response) => log::debug!(
                "📥 请求完成 - type={} 响应长度={}",
                operation.name(),
                response.len()
            ),
            Err(err) => log::warn!("⚠️ 请求失败 - type={}：{}", operation.name(), err),
        }

        result
    }

    /// 以字符串操作名发出请求；未知操作名在发出前即被拒绝。
    pub async fn submit_raw(&self, name: &str, payload: &QueryMap) -> Result<String, GatewayError> {
        let operation = Operation::from_payload(name, payload)?;
        self.submit(&operation).await
    }
}
