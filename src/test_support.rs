//! 单元测试共用的替身：脚本化传输与记录型宿主。

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use tokio::sync::Notify;

use crate::gateway::{Endpoint, GatewayError, RequestLifecycle, Transport};
use crate::query::QueryMap;
use crate::router::{Dialog, UiHost};

pub(crate) fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
    });

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode test image");
    cursor.into_inner()
}

#[derive(Default)]
struct Script {
    calls: Mutex<Vec<(Endpoint, QueryMap)>>,
    responses: Mutex<VecDeque<Result<String, GatewayError>>>,
    observer: Mutex<Option<RequestLifecycle>>,
    observed: Mutex<Vec<usize>>,
    hang_next: AtomicBool,
    gate_next: Mutex<Option<Arc<Notify>>>,
}

/// 按队列依次返回预设响应；队列为空时返回空串。
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Script>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_response(&self, response: Result<String, GatewayError>) {
        self.script.responses.lock().unwrap().push_back(response);
    }

    /// 下一次请求永不完成。
    pub(crate) fn hang_next(&self) {
        self.script.hang_next.store(true, Ordering::SeqCst);
    }

    /// 下一次请求等到返回的 `Notify` 被放行后才完成。
    pub(crate) fn gate_next(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.script.gate_next.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// 在每次请求发出时记录计数器的值。
    pub(crate) fn observe(&self, lifecycle: RequestLifecycle) {
        *self.script.observer.lock().unwrap() = Some(lifecycle);
    }

    pub(crate) fn observed_in_flight(&self) -> Vec<usize> {
        self.script.observed.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> Vec<(Endpoint, QueryMap)> {
        self.script.calls.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn post(&self, endpoint: Endpoint, body: &QueryMap) -> Result<String, GatewayError> {
        self.script.calls.lock().unwrap().push((endpoint, body.clone()));

        let in_flight = self.script.observer.lock().unwrap().as_ref().map(RequestLifecycle::in_flight);
        if let Some(in_flight) = in_flight {
            self.script.observed.lock().unwrap().push(in_flight);
        }

        if self.script.hang_next.swap(false, Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        let gate = self.script.gate_next.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let next = self.script.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(String::new()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostEvent {
    Confirm(String),
    Dialog(Dialog),
    Navigate(String),
    Reload,
    Message(String),
}

/// 记录所有界面动作，确认框固定返回预设答案。
pub(crate) struct RecordingHost {
    answer: bool,
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub(crate) fn answering(answer: bool) -> Self {
        Self {
            answer,
            events: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl UiHost for RecordingHost {
    fn confirm(&self, prompt: &str) -> bool {
        self.record(HostEvent::Confirm(prompt.to_string()));
        self.answer
    }

    fn open_dialog(&self, dialog: Dialog) {
        self.record(HostEvent::Dialog(dialog));
    }

    fn navigate(&self, url: &str) {
        self.record(HostEvent::Navigate(url.to_string()));
    }

    fn reload(&self) {
        self.record(HostEvent::Reload);
    }

    fn show_message(&self, message: &str) {
        self.record(HostEvent::Message(message.to_string()));
    }
}
