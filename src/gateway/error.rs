/// 请求通道错误类型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("网络错误：{0}")]
    Network(String),

    #[error("服务器返回 HTTP {0}")]
    Status(u16),

    #[error("未知操作：{0}")]
    UnknownOperation(String),

    #[error("操作 {operation} 缺少字段 {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("地址无效：{0}")]
    InvalidUrl(String),
}
