//! # 附件批次模块（AttachmentBatch）
//!
//! ## 设计思路
//!
//! 一次文件选择可能带来多张图片，每张独立归一化、并发执行；
//! 谁先完成谁先追加，批次顺序即完成顺序，而不是选择顺序。
//! 调用方不能假设“第 i 个文件对应批次第 i 项”。
//!
//! ## 实现思路
//!
//! - 克隆批次得到同一份存储的句柄，并发任务各自持有一份。
//! - 追加是单调的（不会单独删除某一项），只有整体 `clear`。
//! - 条目只在整条归一化链路完成后才追加，批次中不存在“半成品”。
//! - 通过 `watch` 通道暴露实时数量，供宿主界面显示“已添加 N 张”。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::image_handler::{EncodedImage, ImageNormalizer, ImageSource};

/// 单个来源的失败记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    /// 来源在本次选择中的序号；任务异常退出时无法得知。
    pub index: Option<usize>,
    pub message: String,
}

/// 一次批量导入的结果汇总。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub added: usize,
    pub failed: Vec<IngestFailure>,
}

struct BatchInner {
    images: Mutex<Vec<EncodedImage>>,
    count_tx: watch::Sender<usize>,
}

/// 附件批次。
#[derive(Clone)]
pub struct AttachmentBatch {
    inner: Arc<BatchInner>,
}

impl Default for AttachmentBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachmentBatch {
    pub fn new() -> Self {
        let (count_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(BatchInner {
                images: Mutex::new(Vec::new()),
                count_tx,
            }),
        }
    }

    // 追加是单调的，锁中毒时内部数据仍然完整，直接取回继续使用
    fn images(&self) -> MutexGuard<'_, Vec<EncodedImage>> {
        self.inner.images.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 追加一张已完成归一化的图片。
    pub fn add(&self, image: EncodedImage) {
        let mut images = self.images();
        images.push(image);
        self.inner.count_tx.send_replace(images.len());
    }

    /// 清空批次；重复调用无副作用。
    pub fn clear(&self) {
        let mut images = self.images();
        if images.is_empty() {
            return;
        }
        images.clear();
        self.inner.count_tx.send_replace(0);
    }

    pub fn count(&self) -> usize {
        self.images().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// 当前内容的快照（按完成顺序）。
    pub fn snapshot(&self) -> Vec<EncodedImage> {
        self.images().clone()
    }

    /// 订阅实时数量。
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.inner.count_tx.subscribe()
    }

    /// 并发归一化一组来源，每完成一张立即追加。
    ///
    /// 等待本次启动的全部任务结束后返回汇总；
    /// 失败的来源被跳过并记录，不会留下任何条目。
    pub async fn ingest(
        &self,
        normalizer: &ImageNormalizer,
        sources: Vec<ImageSource>,
        crop_to_square: bool,
    ) -> IngestReport {
        let mut tasks = JoinSet::new();

        for (index, source) in sources.into_iter().enumerate() {
            let normalizer = normalizer.clone();
            let batch = self.clone();
            tasks.spawn(async move {
                let image = normalizer
                    .normalize(source, crop_to_square)
                    .await
                    .map_err(|e| IngestFailure {
                        index: Some(index),
                        message: e.to_string(),
                    })?;
                batch.add(image);
                Ok::<usize, IngestFailure>(index)
            });
        }

        let mut report = IngestReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(index)) => {
                    log::debug!("📎 附件 #{} 已加入批次", index);
                    report.added += 1;
                }
                Ok(Err(failure)) => {
                    log::warn!("⚠️ 附件 #{:?} 归一化失败，已跳过：{}", failure.index, failure.message);
                    report.failed.push(failure);
                }
                Err(err) => {
                    log::error!("附件归一化任务异常退出：{}", err);
                    report.failed.push(IngestFailure {
                        index: None,
                        message: err.to_string(),
                    });
                }
            }
        }

        // 未知序号排在最后
        report.failed.sort_by_key(|f| (f.index.is_none(), f.index));
        log::info!(
            "📎 附件导入完成 - 成功 {} 张，失败 {} 张，批次共 {} 张",
            report.added,
            report.failed.len(),
            self.count()
        );
        report
    }
}
