//! # nightweb 客户端 — 命令行宿主
//!
//! 本文件只负责参数解析、日志初始化与终端宿主实现。
//! 业务逻辑分布在库的各子模块中，详见 `lib.rs` 架构文档。

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use nightweb_client::AppError;
use nightweb_client::config::ClientConfig;
use nightweb_client::gateway::{HttpTransport, RequestLifecycle, ResponseAction};
use nightweb_client::image_handler::{ImageNormalizer, ImageSource};
use nightweb_client::router::{ActionRouter, Dialog, UiHost};
use nightweb_client::session::{ClientSession, PostDraft};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON 配置文件路径
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 覆盖配置中的服务器地址
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// 分发一条命令串
    Dispatch {
        command: String,

        /// 执行前的确认提示
        #[arg(long)]
        confirm: Option<String>,

        /// 自动同意所有确认
        #[arg(long)]
        yes: bool,
    },
    /// 发布一条帖子
    Post {
        body: String,

        #[arg(long)]
        attach: Vec<PathBuf>,

        #[arg(long, requires = "ptr_time")]
        ptr_hash: Option<String>,

        #[arg(long, requires = "ptr_hash")]
        ptr_time: Option<String>,
    },
    /// 归一化单张图片
    Normalize {
        file: PathBuf,

        /// 居中裁剪为正方形
        #[arg(long)]
        crop: bool,

        /// 写出编码后的字节而不是打印 data URI
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// 终端宿主：确认框读标准输入，其余动作打印到标准输出。
struct TerminalHost {
    assume_yes: bool,
}

impl UiHost for TerminalHost {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            log::info!("自动确认：{}", prompt);
            return true;
        }

        print!("{} [y/N] ", prompt);
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn open_dialog(&self, dialog: Dialog) {
        match dialog {
            Dialog::EditPost(post) => println!("[edit-post] create-time={} body={}", post.create_time, post.body),
            Dialog::Link { query } => println!("[link] {}", query),
            other => println!("[{}]", other.name()),
        }
    }

    fn navigate(&self, url: &str) {
        println!("→ {}", url);
    }

    fn reload(&self) {
        println!("✔ 完成（刷新）");
    }

    fn show_message(&self, message: &str) {
        println!("{}", message);
    }
}

fn watch_busy(lifecycle: &RequestLifecycle) {
    let mut busy = lifecycle.subscribe();
    tokio::spawn(async move {
        while busy.changed().await.is_ok() {
            if *busy.borrow_and_update() {
                log::debug!("⏳ 请求进行中");
            } else {
                log::debug!("✅ 空闲");
            }
        }
    });
}

fn build_session(config: &ClientConfig) -> Result<ClientSession<HttpTransport>, AppError> {
    let transport = HttpTransport::new(&config.server_url, config.endpoint_paths())?;
    let session = ClientSession::from_config(config, transport)?;
    watch_busy(session.lifecycle());
    Ok(session)
}

async fn run(args: Args) -> Result<(), AppError> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load_from_path(path),
        None => ClientConfig::default(),
    };
    if let Some(server) = args.server {
        config.server_url = server;
    }
    log::info!("🚀 nightweb-client 启动 - server={}", config.server_url);

    match args.command {
        Cmd::Dispatch {
            command,
            confirm,
            yes,
        } => {
            let session = Arc::new(build_session(&config)?);
            let router = ActionRouter::new(
                TerminalHost { assume_yes: yes },
                session,
                config.endpoint_paths(),
            );
            let outcome = router.dispatch_raw(&command, confirm.as_deref()).await;
            log::info!("分发结果：{:?}", outcome);
        }
        Cmd::Post {
            body,
            attach,
            ptr_hash,
            ptr_time,
        } => {
            let session = build_session(&config)?;
            session.open_compose();

            if !attach.is_empty() {
                let sources = attach.into_iter().map(ImageSource::FilePath).collect();
                let report = session.attach(sources).await?;
                for failure in &report.failed {
                    match failure.index {
                        Some(index) => eprintln!("跳过附件 #{}：{}", index, failure.message),
                        None => eprintln!("跳过附件：{}", failure.message),
                    }
                }
            }

            let action = session
                .submit_post(PostDraft {
                    body,
                    ptr_hash,
                    ptr_time,
                })
                .await?;
            match action {
                ResponseAction::Reload => println!("✔ 已发布"),
                ResponseAction::ShowMessage(message) => println!("{}", message),
                other => log::debug!("忽略响应动作：{:?}", other),
            }
        }
        Cmd::Normalize { file, crop, out } => {
            let normalizer = ImageNormalizer::new(config.image_config()?)?;
            let image = normalizer.normalize(ImageSource::FilePath(file), crop).await?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, image.as_bytes()).await?;
                    log::info!(
                        "💾 已写出 {} - {}x{} {} 字节",
                        path.display(),
                        image.width(),
                        image.height(),
                        image.len()
                    );
                }
                None => println!("{}", image.to_data_uri()),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        log::error!("❌ {}", e);
        std::process::exit(1);
    }
}
