//! 宿主抽象：浏览器、webview 或终端都通过 `UiHost` 接入路由器。

use crate::session::{PostRef, ReplyPointer};

/// 路由器可以打开的模态对话框。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    /// 带回复指针时打开的是回复草稿。
    NewPost(ReplyPointer),
    EditPost(PostRef),
    Profile,
    ImportUser,
    ExportUser,
    Search,
    /// 展示可分享的命令串。
    Link { query: String },
}

impl Dialog {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewPost(_) => "new-post",
            Self::EditPost(_) => "edit-post",
            Self::Profile => "profile",
            Self::ImportUser => "import-user",
            Self::ExportUser => "export-user",
            Self::Search => "search",
            Self::Link { .. } => "link",
        }
    }
}

/// 宿主界面能力。
///
/// 所有方法都是同步调用：确认框阻塞直到用户作答，其余动作只是投递给界面。
pub trait UiHost: Send + Sync {
    /// 弹出确认框，返回用户是否同意。
    fn confirm(&self, prompt: &str) -> bool;

    fn open_dialog(&self, dialog: Dialog);

    /// 跳转到相对地址（`<endpoint>?<command>`）或服务器返回的地址。
    fn navigate(&self, url: &str);

    /// 整页刷新。
    fn reload(&self);

    fn show_message(&self, message: &str);
}
