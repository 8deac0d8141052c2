//! # 会话控制器（ClientSession）
//!
//! ## 设计思路
//!
//! 一次客户端会话内的可变状态全部归这里所有，并显式传递给路由器：
//! - 请求通道（含生命周期计数）
//! - 图片归一化处理器
//! - 发帖附件批次 `AttachmentBatch`
//! - 头像单图槽位
//! - 发帖状态机 `ComposeState`
//!
//! 状态只在打开对话框的边界上重置（`open_compose` / `open_edit`），
//! 不存在隐式的全局清理。
//!
//! ## 发帖状态机
//!
//! ```text
//! Idle ──open──▶ Composing ──submit──▶ Submitting ──┬─▶ Reloaded
//!                   ▲                               └─▶ Failed ──submit──▶ Submitting
//!                   └──────────── open（任意状态）
//! ```
//!
//! 提交失败时批次保留，可直接重试；只有成功提交才清空批次。
//! 草稿每次重置都会换代；在途提交完成时若草稿已换代，结果不再作用于新草稿。

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::attachments::{AttachmentBatch, IngestReport};
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::gateway::{
    GatewayError, Operation, RequestGateway, RequestLifecycle, ResponseAction, Transport,
};
use crate::image_handler::{EncodedImage, ImageNormalizer, ImageSource};
use crate::query::QueryMap;

/// 发帖流程状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeState {
    Idle,
    Composing,
    Submitting,
    Reloaded,
    Failed,
}

/// 编辑已有帖子时透传的帖子字段。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostRef {
    pub create_time: String,
    pub body: String,
    pub ptr_hash: Option<String>,
    pub ptr_time: Option<String>,
    pub pic_hashes: Vec<String>,
}

impl PostRef {
    /// 从命令参数提取；没有 `create-time` 时无法定位帖子。
    pub fn from_params(params: &QueryMap) -> Option<Self> {
        let create_time = params.get("create-time").filter(|v| !v.is_empty())?;
        let non_empty = |key: &str| {
            params
                .get(key)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let pic_hashes = params
            .get("pic-hashes")
            .filter(|v| !v.is_empty())
            .map(|raw| serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|_| vec![raw.to_string()]))
            .unwrap_or_default();

        Some(Self {
            create_time: create_time.to_string(),
            body: params.get("body").unwrap_or_default().to_string(),
            ptr_hash: non_empty("ptr-hash"),
            ptr_time: non_empty("ptr-time"),
            pic_hashes,
        })
    }
}

/// 新帖回复的目标帖子指针，来自 `new-post` 命令的 `ptr-hash` / `ptr-time`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyPointer {
    pub ptr_hash: Option<String>,
    pub ptr_time: Option<String>,
}

impl ReplyPointer {
    pub fn from_params(params: &QueryMap) -> Self {
        let non_empty = |key: &str| {
            params
                .get(key)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            ptr_hash: non_empty("ptr-hash"),
            ptr_time: non_empty("ptr-time"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ptr_hash.is_none() && self.ptr_time.is_none()
    }
}

/// 待提交的帖子正文与回复指针。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub body: String,
    pub ptr_hash: Option<String>,
    pub ptr_time: Option<String>,
}

#[derive(Debug)]
struct ComposeInner {
    state: ComposeState,
    editing: Option<PostRef>,
    reply: ReplyPointer,
    /// 每次重置草稿加一；在途提交完成时据此判断草稿是否已被替换。
    generation: u64,
}

/// 会话级控制器。
pub struct ClientSession<T> {
    gateway: RequestGateway<T>,
    normalizer: ImageNormalizer,
    attachments: AttachmentBatch,
    profile_pic: Mutex<Option<EncodedImage>>,
    compose: Mutex<ComposeInner>,
}

impl<T: Transport> ClientSession<T> {
    pub fn new(normalizer: ImageNormalizer, transport: T) -> Self {
        Self {
            gateway: RequestGateway::new(transport),
            normalizer,
            attachments: AttachmentBatch::new(),
            profile_pic: Mutex::new(None),
            compose: Mutex::new(ComposeInner {
                state: ComposeState::Idle,
                editing: None,
                reply: ReplyPointer::default(),
                generation: 0,
            }),
        }
    }

    pub fn from_config(config: &ClientConfig, transport: T) -> Result<Self, AppError> {
        let normalizer = ImageNormalizer::new(config.image_config()?)?;
        Ok(Self::new(normalizer, transport))
    }

    pub fn gateway(&self) -> &RequestGateway<T> {
        &self.gateway
    }

    pub fn lifecycle(&self) -> &RequestLifecycle {
        self.gateway.lifecycle()
    }

    pub fn normalizer(&self) -> &ImageNormalizer {
        &self.normalizer
    }

    pub fn attachments(&self) -> &AttachmentBatch {
        &self.attachments
    }

    fn compose(&self) -> MutexGuard<'_, ComposeInner> {
        self.compose.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn profile_slot(&self) -> MutexGuard<'_, Option<EncodedImage>> {
        self.profile_pic.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn compose_state(&self) -> ComposeState {
        self.compose().state
    }

    /// 正在编辑的帖子（新帖为 `None`）。
    pub fn editing(&self) -> Option<PostRef> {
        self.compose().editing.clone()
    }

    /// 新帖草稿的回复目标。
    pub fn reply_to(&self) -> ReplyPointer {
        self.compose().reply.clone()
    }

    /// 打开新帖对话框：清空批次与草稿。
    pub fn open_compose(&self) {
        self.open_reply(ReplyPointer::default());
    }

    /// 打开新帖对话框并记下回复目标。
    pub fn open_reply(&self, reply: ReplyPointer) {
        self.reset_compose(ComposeState::Composing, None, reply);
    }

    /// 打开编辑对话框，预填帖子字段。
    pub fn open_edit(&self, post: PostRef) {
        self.reset_compose(ComposeState::Composing, Some(post), ReplyPointer::default());
    }

    /// 放弃当前草稿。
    pub fn clear_compose(&self) {
        self.reset_compose(ComposeState::Idle, None, ReplyPointer::default());
    }

    fn reset_compose(&self, state: ComposeState, editing: Option<PostRef>, reply: ReplyPointer) {
        let mut compose = self.compose();
        self.attachments.clear();
        compose.state = state;
        compose.editing = editing;
        compose.reply = reply;
        compose.generation += 1;
        log::debug!(
            "📝 发帖会话已重置 - 状态={:?} 编辑模式={} 回复={}",
            compose.state,
            compose.editing.is_some(),
            !compose.reply.is_empty()
        );
    }

    /// 为当前新帖草稿追加配图（等比缩放，不裁剪）。编辑已有帖子时不接受新配图。
    pub async fn attach(&self, sources: Vec<ImageSource>) -> Result<IngestReport, AppError> {
        {
            let compose = self.compose();
            match compose.state {
                ComposeState::Composing | ComposeState::Failed => {}
                other => {
                    return Err(AppError::InvalidState(format!(
                        "当前状态 {:?} 不能添加附件",
                        other
                    )));
                }
            }
            if compose.editing.is_some() {
                return Err(AppError::InvalidState("编辑帖子时不能添加新配图".to_string()));
            }
        }
        Ok(self
            .attachments
            .ingest(&self.normalizer, sources, false)
            .await)
    }

    /// 归一化并暂存头像（居中裁剪为正方形）。后选的图片覆盖先选的。
    pub async fn set_profile_pic(&self, source: ImageSource) -> Result<(), AppError> {
        let image = self.normalizer.normalize(source, true).await?;
        log::info!("🖼️ 头像已就绪 - {}x{} {}", image.width(), image.height(), image.mime_type());
        *self.profile_slot() = Some(image);
        Ok(())
    }

    pub fn profile_pic(&self) -> Option<EncodedImage> {
        self.profile_slot().clone()
    }

    /// 发出操作并按操作语义解释响应。
    pub async fn execute(&self, operation: &Operation) -> Result<ResponseAction, GatewayError> {
        let response = self.gateway.submit(operation).await?;
        Ok(operation.response_action(&response))
    }

    pub async fn save_profile(&self, name: &str, body: &str) -> Result<ResponseAction, AppError> {
        let pic = self.profile_slot().as_ref().map(EncodedImage::to_data_uri);
        let operation = Operation::SaveProfile {
            name: name.to_string(),
            body: body.to_string(),
            pic,
        };

        let action = self.execute(&operation).await?;
        if action == ResponseAction::Reload {
            self.profile_slot().take();
        }
        Ok(action)
    }

    /// 提交当前草稿：新帖走 `new-post`，编辑走 `edit-post`。
    ///
    /// 只有服务器返回空串（整页刷新）才算成功并清空批次；
    /// 网络错误或服务器消息都会进入 `Failed`，批次保留。
    pub async fn submit_post(&self, draft: PostDraft) -> Result<ResponseAction, AppError> {
        let (editing, reply, generation) = {
            let mut compose = self.compose();
            match compose.state {
                ComposeState::Composing | ComposeState::Failed => {}
                ComposeState::Submitting => {
                    return Err(AppError::InvalidState("帖子正在提交中".to_string()));
                }
                other => {
                    return Err(AppError::InvalidState(format!(
                        "当前状态 {:?} 没有可提交的草稿",
                        other
                    )));
                }
            }
            compose.state = ComposeState::Submitting;
            (compose.editing.clone(), compose.reply.clone(), compose.generation)
        };

        let operation = match editing {
            Some(post) => Operation::EditPost {
                body: draft.body,
                create_time: post.create_time,
                ptr_hash: draft.ptr_hash.or(post.ptr_hash),
                ptr_time: draft.ptr_time.or(post.ptr_time),
                pic_hashes: post.pic_hashes,
            },
            None => Operation::NewPost {
                body: draft.body,
                pics: self
                    .attachments
                    .snapshot()
                    .iter()
                    .map(EncodedImage::to_data_uri)
                    .collect(),
                ptr_hash: draft.ptr_hash.or(reply.ptr_hash),
                ptr_time: draft.ptr_time.or(reply.ptr_time),
            },
        };

        let result = self.execute(&operation).await;
        let next = match &result {
            Ok(ResponseAction::Reload) => ComposeState::Reloaded,
            _ => ComposeState::Failed,
        };
        {
            let mut compose = self.compose();
            if compose.generation == generation {
                if next == ComposeState::Reloaded {
                    self.attachments.clear();
                }
                compose.state = next;
                log::info!("📝 {} 提交结束 - 状态={:?}", operation.name(), next);
            } else {
                // 提交期间草稿已被重新打开，结果不再作用于新草稿
                log::info!("📝 {} 提交结束，草稿已重置，保留当前状态", operation.name());
            }
        }

        Ok(result?)
    }

    pub async fn import_user(&self, file: &str, pass: &str) -> Result<ResponseAction, AppError> {
        let operation = Operation::ImportUser {
            file: file.to_string(),
            pass: pass.to_string(),
        };
        Ok(self.execute(&operation).await?)
    }

    pub async fn export_user(&self, pass: &str) -> Result<ResponseAction, AppError> {
        let operation = Operation::ExportUser {
            pass: pass.to_string(),
        };
        Ok(self.execute(&operation).await?)
    }
}
