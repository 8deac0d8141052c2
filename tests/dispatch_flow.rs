use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use nightweb_client::gateway::{Endpoint, EndpointPaths, GatewayError, Transport};
use nightweb_client::image_handler::{ImageConfig, ImageNormalizer, ImageSource, TransportCodec};
use nightweb_client::query::QueryMap;
use nightweb_client::router::{ActionRouter, Dialog, DispatchOutcome, UiHost};
use nightweb_client::session::{ClientSession, ComposeState, PostDraft};

#[derive(Clone, Default)]
struct FakeServer {
    requests: Arc<Mutex<Vec<(Endpoint, QueryMap)>>>,
    replies: Arc<Mutex<VecDeque<Result<String, GatewayError>>>>,
}

impl FakeServer {
    fn reply(&self, reply: Result<String, GatewayError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    fn requests(&self) -> Vec<(Endpoint, QueryMap)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for FakeServer {
    async fn post(&self, endpoint: Endpoint, body: &QueryMap) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push((endpoint, body.clone()));
        let reply = self.replies.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(String::new()))
    }
}

#[derive(Default)]
struct Screen {
    accept: bool,
    log: Mutex<Vec<String>>,
}

impl Screen {
    fn accepting(accept: bool) -> Self {
        Self {
            accept,
            log: Mutex::new(Vec::new()),
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl UiHost for Screen {
    fn confirm(&self, prompt: &str) -> bool {
        self.log.lock().unwrap().push(format!("confirm:{prompt}"));
        self.accept
    }

    fn open_dialog(&self, dialog: Dialog) {
        self.log.lock().unwrap().push(format!("dialog:{}", dialog.name()));
    }

    fn navigate(&self, url: &str) {
        self.log.lock().unwrap().push(format!("navigate:{url}"));
    }

    fn reload(&self) {
        self.log.lock().unwrap().push("reload".to_string());
    }

    fn show_message(&self, message: &str) {
        self.log.lock().unwrap().push(format!("message:{message}"));
    }
}

fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 255) as u8, (y % 255) as u8, 128, 255])
    });
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode test image");
    cursor.into_inner()
}

fn setup(accept: bool) -> (FakeServer, ActionRouter<Screen, FakeServer>) {
    let server = FakeServer::default();
    let normalizer = ImageNormalizer::with_codec(ImageConfig::default(), TransportCodec::Jpeg)
        .expect("valid config");
    let session = Arc::new(ClientSession::new(normalizer, server.clone()));
    let router = ActionRouter::new(Screen::accepting(accept), session, EndpointPaths::default());
    (server, router)
}

#[tokio::test]
async fn declined_confirmation_makes_no_requests_and_no_navigation() {
    let (server, router) = setup(false);

    let outcome = router
        .dispatch_raw("type=delete-user&userhash=abc", Some("Delete this user?"))
        .await;

    assert_eq!(outcome, DispatchOutcome::Cancelled);
    assert!(server.requests().is_empty());
    assert_eq!(router.host().log(), vec!["confirm:Delete this user?".to_string()]);
}

#[tokio::test]
async fn toggle_fav_posts_full_parameter_set_to_general_endpoint() {
    let (server, router) = setup(true);

    let outcome = router
        .dispatch_raw("type=toggle-fav&userhash=abc&ptr-hash=p1&ptr-time=99", None)
        .await;

    assert_eq!(outcome, DispatchOutcome::Invoked);
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, Endpoint::General);
    assert_eq!(
        nightweb_client::query::encode(&requests[0].1),
        "type=toggle-fav&userhash=abc&ptr-hash=p1&ptr-time=99"
    );
    assert_eq!(router.host().log(), vec!["reload".to_string()]);
    assert_eq!(router.session().lifecycle().in_flight(), 0);
}

#[tokio::test]
async fn unknown_command_changes_nothing() {
    let (server, router) = setup(true);
    router.session().open_compose();

    let outcome = router.dispatch_raw("type=teleport&where=moon", None).await;

    assert_eq!(outcome, DispatchOutcome::Ignored);
    assert!(server.requests().is_empty());
    assert!(router.host().log().is_empty());
    assert_eq!(router.session().compose_state(), ComposeState::Composing);
}

#[tokio::test]
async fn compose_flow_from_link_to_reload() {
    let (server, router) = setup(true);

    assert_eq!(
        router.dispatch_raw("type=new-post", None).await,
        DispatchOutcome::DialogOpened
    );

    let session = router.session();
    let mut live_count = session.attachments().subscribe();
    let report = session
        .attach(vec![
            ImageSource::from(create_png_bytes(2048, 1024)),
            ImageSource::from(create_png_bytes(300, 300)),
            ImageSource::from(b"not an image".to_vec()),
        ])
        .await
        .expect("composing");

    assert_eq!(report.added, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, Some(2));
    assert_eq!(*live_count.borrow_and_update(), 2);

    let mut sizes: Vec<(u32, u32)> = session
        .attachments()
        .snapshot()
        .iter()
        .map(|image| (image.width(), image.height()))
        .collect();
    sizes.sort();
    assert_eq!(sizes, vec![(300, 300), (1024, 512)]);

    let action = session
        .submit_post(PostDraft {
            body: "two pictures".into(),
            ptr_hash: Some("parent".into()),
            ptr_time: Some("1700000000".into()),
        })
        .await
        .expect("submitted");

    assert_eq!(action, nightweb_client::gateway::ResponseAction::Reload);
    assert_eq!(session.compose_state(), ComposeState::Reloaded);
    assert_eq!(session.attachments().count(), 0);

    let requests = server.requests();
    let payload = &requests[0].1;
    assert_eq!(payload.get("type"), Some("new-post"));
    assert_eq!(payload.get("ptrhash"), Some("parent"));
    let pics: Vec<String> = serde_json::from_str(payload.get("pics").unwrap()).unwrap();
    assert_eq!(pics.len(), 2);
    assert!(pics.iter().all(|p| p.starts_with("data:image/jpeg;base64,")));
}

#[tokio::test]
async fn server_failure_surfaces_as_failed_outcome() {
    let (server, router) = setup(true);
    server.reply(Err(GatewayError::Status(503)));

    let outcome = router.dispatch_raw("type=delete-post&create-time=12", None).await;

    assert_eq!(outcome, DispatchOutcome::Failed);
    assert!(!router.session().lifecycle().is_busy());
}
