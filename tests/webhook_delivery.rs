//! End-to-end delivery tests against a local webhook stub.

use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use market_alert::cli::Cli;
use market_alert::notify::{DiscordNotifier, Embed, MessageOptions, NotifierSettings, WebhookPayload};
use tokio::net::TcpListener;

/// What the stub does for a given path.
#[derive(Clone, Copy)]
enum Reply {
    Status(u16),
    Stall(Duration),
}

/// A recorded request: path and body.
type Hit = (String, Vec<u8>);

struct StubServer {
    addr: SocketAddr,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl StubServer {
    async fn start(routes: &[(&str, Reply)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let routes: Arc<HashMap<String, Reply>> = Arc::new(
            routes
                .iter()
                .map(|(path, reply)| (path.to_string(), *reply))
                .collect(),
        );

        let server_hits = Arc::clone(&hits);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let io = TokioIo::new(stream);
                let hits = Arc::clone(&server_hits);
                let routes = Arc::clone(&routes);

                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let hits = Arc::clone(&hits);
                        let routes = Arc::clone(&routes);
                        async move {
                            let path = req.uri().path().to_string();
                            let body = req.into_body().collect().await?.to_bytes();
                            hits.lock().unwrap().push((path.clone(), body.to_vec()));

                            let status = match routes.get(&path).copied() {
                                Some(Reply::Status(code)) => code,
                                Some(Reply::Stall(delay)) => {
                                    tokio::time::sleep(delay).await;
                                    200
                                }
                                None => 404,
                            };

                            Ok::<_, hyper::Error>(
                                Response::builder()
                                    .status(status)
                                    .body(Full::new(Bytes::new()))
                                    .unwrap(),
                            )
                        }
                    });

                    let _ = http1::Builder::new().serve_connection(io, service).await;
                });
            }
        });

        Self { addr, hits }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn paths(&self) -> Vec<String> {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    fn body(&self, index: usize) -> WebhookPayload {
        serde_json::from_slice(&self.hits.lock().unwrap()[index].1).unwrap()
    }
}

/// Returns a URL nothing is listening on.
async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/dead", addr)
}

#[tokio::test]
async fn primary_success_contacts_only_primary() {
    let stub = StubServer::start(&[("/primary", Reply::Status(204)), ("/backup", Reply::Status(200))]).await;
    let settings = NotifierSettings::new(stub.url("/primary")).with_backups(stub.url("/backup"));
    let notifier = DiscordNotifier::new(&settings).unwrap();

    assert!(notifier.send_message("BTC-USD UPTREND -> DOWNTREND", MessageOptions::new()).await);
    assert_eq!(stub.paths(), vec!["/primary"]);

    let payload = stub.body(0);
    assert_eq!(payload.embeds[0].fields[0].name, "Time (NY)");
    assert!(payload.content.ends_with("BTC-USD UPTREND -> DOWNTREND"));
}

#[tokio::test]
async fn server_error_falls_back_to_backup() {
    let stub = StubServer::start(&[("/primary", Reply::Status(500)), ("/backup", Reply::Status(200))]).await;
    let settings = NotifierSettings::new(stub.url("/primary")).with_backups(stub.url("/backup"));
    let notifier = DiscordNotifier::new(&settings).unwrap();

    let extra = Embed {
        title: Some("Context".to_string()),
        ..Embed::default()
    };
    let delivered = notifier
        .send_message("ETH-USD flipped", MessageOptions::new().embed(extra.clone()))
        .await;

    assert!(delivered);
    assert_eq!(stub.paths(), vec!["/primary", "/backup"]);
    assert_eq!(stub.body(0), stub.body(1));
    assert_eq!(stub.body(1).embeds[1], extra);
}

#[tokio::test]
async fn all_endpoints_failing_returns_false() {
    let stub = StubServer::start(&[
        ("/primary", Reply::Status(500)),
        ("/backup-a", Reply::Status(429)),
        ("/backup-b", Reply::Status(400)),
    ])
    .await;
    let backups = format!("{},,{}", stub.url("/backup-a"), stub.url("/backup-b"));
    let settings = NotifierSettings::new(stub.url("/primary")).with_backups(backups);
    let notifier = DiscordNotifier::new(&settings).unwrap();

    let err = notifier
        .deliver("SPY flipped", MessageOptions::new())
        .await
        .unwrap_err();

    assert!(err.all_rejected());
    assert_eq!(stub.paths(), vec!["/primary", "/backup-a", "/backup-b"]);
}

#[tokio::test]
async fn timeout_and_refused_connection_count_as_failures() {
    let stub = StubServer::start(&[
        ("/slow", Reply::Stall(Duration::from_secs(5))),
        ("/backup", Reply::Status(200)),
    ])
    .await;
    let backups = format!("{},{}", dead_url().await, stub.url("/backup"));
    let settings = NotifierSettings::new(stub.url("/slow"))
        .with_backups(backups)
        .with_timeout(Duration::from_millis(250));
    let notifier = DiscordNotifier::new(&settings).unwrap();

    let delivery = notifier
        .deliver("GC=F flipped", MessageOptions::new())
        .await
        .unwrap();

    assert_eq!(delivery.endpoint, "backup-2");
    assert_eq!(delivery.attempts, 3);
    assert_eq!(stub.paths(), vec!["/slow", "/backup"]);
}

#[tokio::test]
async fn unreachable_endpoints_are_reported_as_such() {
    let settings = NotifierSettings::new(dead_url().await)
        .with_backups(dead_url().await)
        .with_timeout(Duration::from_secs(2));
    let notifier = DiscordNotifier::new(&settings).unwrap();

    assert!(!notifier.send_message("nobody home", MessageOptions::new()).await);

    let err = notifier
        .deliver("nobody home", MessageOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.failures().len(), 2);
    assert!(err.all_unreachable());
}

#[tokio::test]
async fn concurrent_sends_are_independent() {
    let stub = StubServer::start(&[("/primary", Reply::Status(204))]).await;
    let settings = NotifierSettings::new(stub.url("/primary"));
    let notifier = DiscordNotifier::new(&settings).unwrap();

    let (a, b) = tokio::join!(
        notifier.send_message("first", MessageOptions::new()),
        notifier.send_message("second", MessageOptions::new()),
    );

    assert!(a && b);
    assert_eq!(stub.paths().len(), 2);
}

#[tokio::test]
async fn webhook_token_stays_out_of_errors() {
    let url = dead_url().await.replace("/dead", "/api/webhooks/1/secret-token");
    let settings = NotifierSettings::new(url).with_timeout(Duration::from_secs(2));
    let notifier = DiscordNotifier::new(&settings).unwrap();

    let err = notifier
        .deliver("SPY flipped", MessageOptions::new())
        .await
        .unwrap_err();

    let failure = format!("{}", err.failures()[0]);
    assert!(failure.contains("primary"));
    assert!(!failure.contains("secret-token"));
    assert!(!format!("{:?}", err).contains("secret-token"));
    assert!(!format!("{:#}", anyhow::Error::new(err)).contains("secret-token"));
}

/// Writes an asset config with the given Discord toggle and logging off.
fn asset_config(discord_enabled: bool) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "assets:\n  crypto: [BTC-USD]\nnotification:\n  discord:\n    enabled: {}\nlogging:\n  enabled: false\n",
        discord_enabled
    )
    .unwrap();
    file
}

fn send_cli(config: &tempfile::NamedTempFile, webhook: &str, extra: &[&str]) -> Cli {
    let mut args = vec![
        "market-alert",
        "--config",
        config.path().to_str().unwrap(),
        "send",
        "BTC-USD flipped",
        "--webhook",
        webhook,
    ];
    args.extend_from_slice(extra);
    Cli::try_parse_from(args).unwrap()
}

#[tokio::test]
async fn send_is_skipped_when_discord_disabled() {
    let stub = StubServer::start(&[("/primary", Reply::Status(204))]).await;
    let config = asset_config(false);

    market_alert::run(send_cli(&config, &stub.url("/primary"), &[]))
        .await
        .unwrap();

    assert!(stub.paths().is_empty());
}

#[tokio::test]
async fn force_sends_despite_disabled_toggle() {
    let stub = StubServer::start(&[("/primary", Reply::Status(204))]).await;
    let config = asset_config(false);

    market_alert::run(send_cli(&config, &stub.url("/primary"), &["--force"]))
        .await
        .unwrap();

    assert_eq!(stub.paths(), vec!["/primary"]);
}

#[tokio::test]
async fn send_fails_when_no_webhook_accepts() {
    let stub = StubServer::start(&[("/primary", Reply::Status(500))]).await;
    let config = asset_config(true);

    let result = market_alert::run(send_cli(&config, &stub.url("/primary"), &[])).await;

    assert!(result.is_err());
    assert_eq!(stub.paths(), vec!["/primary"]);
}
