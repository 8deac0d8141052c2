/// 服务器返回串经操作语义解释后的界面动作。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseAction {
    /// 无条件成功：整页刷新。
    Reload,
    /// 面向用户的消息（错误或提示）。
    ShowMessage(String),
    /// 跳转到返回的地址。
    Navigate(String),
    /// 需要用户确认后才继续。
    Confirm(String),
    /// 静默忽略。
    Ignore,
}
