//! 路由分发：确认 → 解析动作 → 对话框 / 请求 / 跳转。

use std::sync::Arc;

use crate::gateway::{EndpointPaths, Operation, ResponseAction, Transport};
use crate::query::Command;
use crate::session::ClientSession;

use super::action::Action;
use super::host::{Dialog, UiHost};

/// 一次分发的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 用户拒绝了确认框，未产生任何副作用。
    Cancelled,
    DialogOpened,
    Navigated,
    /// 请求已完成，响应已交给宿主。
    Invoked,
    /// 字段缺失或请求失败。
    Failed,
    /// 未知或缺少 `type` 的命令。
    Ignored,
}

/// 命令路由器。
pub struct ActionRouter<H, T> {
    host: H,
    session: Arc<ClientSession<T>>,
    paths: EndpointPaths,
}

impl<H: UiHost, T: Transport> ActionRouter<H, T> {
    pub fn new(host: H, session: Arc<ClientSession<T>>, paths: EndpointPaths) -> Self {
        Self {
            host,
            session,
            paths,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn session(&self) -> &Arc<ClientSession<T>> {
        &self.session
    }

    /// 分发原始命令串；缺少 `type` 的串静默忽略。
    pub async fn dispatch_raw(&self, raw: &str, prompt: Option<&str>) -> DispatchOutcome {
        match Command::parse(raw) {
            Ok(command) => self.dispatch(&command, prompt).await,
            Err(err) => {
                log::debug!("忽略命令：{}", err);
                DispatchOutcome::Ignored
            }
        }
    }

    /// 分发一条命令。
    ///
    /// 提供了确认提示且用户拒绝时什么都不做。未知类型静默忽略，从不报错。
    pub async fn dispatch(&self, command: &Command, prompt: Option<&str>) -> DispatchOutcome {
        if let Some(prompt) = prompt {
            if !self.host.confirm(prompt) {
                log::debug!("🚫 用户取消 - type={}", command.kind());
                return DispatchOutcome::Cancelled;
            }
        }

        let action = match Action::from_command(command) {
            Ok(action) => action,
            Err(err) => {
                log::warn!("⚠️ 命令无效 - type={}：{}", command.kind(), err);
                return DispatchOutcome::Failed;
            }
        };

        match action {
            Action::Dialog(dialog) => {
                self.open_dialog(dialog);
                DispatchOutcome::DialogOpened
            }
            Action::Invoke(operation) => self.invoke(operation).await,
            Action::Navigate(endpoint) => {
                let url = format!("{}?{}", self.paths.path(endpoint), command.to_query_string());
                log::debug!("🧭 跳转 {}", url);
                self.host.navigate(&url);
                DispatchOutcome::Navigated
            }
            Action::Unknown => {
                log::debug!("忽略未知命令类型：{}", command.kind());
                DispatchOutcome::Ignored
            }
        }
    }

    // 打开对话框前做类型相关的准备，这是导航引起状态重置的唯一位置
    fn open_dialog(&self, dialog: Dialog) {
        match &dialog {
            Dialog::NewPost(reply) => self.session.open_reply(reply.clone()),
            Dialog::EditPost(post) => self.session.open_edit(post.clone()),
            _ => {}
        }
        log::debug!("🪟 打开对话框 {}", dialog.name());
        self.host.open_dialog(dialog);
    }

    async fn invoke(&self, operation: Operation) -> DispatchOutcome {
        let action = match self.session.execute(&operation).await {
            Ok(action) => action,
            Err(err) => {
                log::error!("❌ {} 请求失败：{}", operation.name(), err);
                return DispatchOutcome::Failed;
            }
        };

        // 服务器要求二次确认时，同意后执行后续操作；后续操作的响应不再展开确认
        let action = match action {
            ResponseAction::Confirm(prompt) => {
                let Some(next) = operation.follow_up() else {
                    self.host.show_message(&prompt);
                    return DispatchOutcome::Invoked;
                };
                if !self.host.confirm(&prompt) {
                    return DispatchOutcome::Cancelled;
                }
                match self.session.execute(&next).await {
                    Ok(action) => action,
                    Err(err) => {
                        log::error!("❌ {} 请求失败：{}", next.name(), err);
                        return DispatchOutcome::Failed;
                    }
                }
            }
            other => other,
        };

        self.apply(action);
        DispatchOutcome::Invoked
    }

    fn apply(&self, action: ResponseAction) {
        match action {
            ResponseAction::Reload => self.host.reload(),
            ResponseAction::ShowMessage(message) => self.host.show_message(&message),
            ResponseAction::Navigate(target) => self.host.navigate(&target),
            ResponseAction::Confirm(prompt) => {
                log::warn!("后续操作再次要求确认，已忽略：{}", prompt);
            }
            ResponseAction::Ignore => {}
        }
    }
}
