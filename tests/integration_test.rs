use scan_label_kiosk::clients::{LookupClient, PrintClient};
use scan_label_kiosk::error::ApiError;
use scan_label_kiosk::orchestrator::Command;
use scan_label_kiosk::services::exporter::export_file_name;
use scan_label_kiosk::services::PRODUCTS_SLOT;
use scan_label_kiosk::storage::LocalStore;
use scan_label_kiosk::{App, Config, PrintStatus, ProductRecord};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// 本地桩服务：同时扮演查询服务和打印服务
///
/// - `code=ABC123` → Aspirin，`code=JAM` → Jam，`code=SLOW` → Slow，其余 404
/// - `code=GARBLED` 返回 200 但不是 JSON，`code=STALL` 永不应答
/// - 打印 `Uniq=ABC123` 成功，`Uniq=SLOW` 永不应答，其余返回 500 `{status:"jammed"}`
async fn spawn_stub() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(serve(stream));
        }
    });

    addr
}

async fn serve(mut stream: TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let lower = l.to_ascii_lowercase();
            lower
                .strip_prefix("content-length:")
                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    let request_line = head.lines().next().unwrap_or_default().to_string();

    let Some((status, json)) = route(&request_line, &body) else {
        // 保持连接但不应答
        std::future::pending::<()>().await;
        return;
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        json.len(),
        json
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn route(request_line: &str, body: &str) -> Option<(&'static str, String)> {
    let reply = |status, json: &str| Some((status, json.to_string()));

    if request_line.starts_with("GET /api/fetch-product?code=ABC123 ") {
        return reply(
            "200 OK",
            r#"{"data":{"product_name":"Aspirin","lot":"L-01","expired_date":"2027-12-31","retail_unit_detail":{"unit":"Box"}}}"#,
        );
    }
    if request_line.starts_with("GET /api/fetch-product?code=JAM ") {
        return reply("200 OK", r#"{"data":{"product_name":"Jam","unit_name":"Jar"}}"#);
    }
    if request_line.starts_with("GET /api/fetch-product?code=SLOW ") {
        return reply("200 OK", r#"{"data":{"product_name":"Slow"}}"#);
    }
    if request_line.starts_with("GET /api/fetch-product?code=EMPTY ") {
        return reply("200 OK", r#"{"message":"not indexed"}"#);
    }
    if request_line.starts_with("GET /api/fetch-product?code=GARBLED ") {
        return reply("200 OK", "<html>maintenance</html>");
    }
    if request_line.starts_with("GET /api/fetch-product?code=STALL ") {
        return None;
    }
    if request_line.starts_with("POST /print/ ") {
        if body.contains(r#""Uniq":"ABC123""#) {
            return reply("200 OK", r#"{"status":"printed"}"#);
        }
        if body.contains(r#""Uniq":"SLOW""#) {
            return None;
        }
        return reply("500 Internal Server Error", r#"{"status":"jammed"}"#);
    }
    reply("404 Not Found", r#"{"error":"not found"}"#)
}

/// 绑定后立刻释放，得到一个没有监听者的端口
async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

fn config_for(addr: SocketAddr, storage: &tempfile::TempDir, export: &tempfile::TempDir) -> Config {
    Config {
        lookup_base_url: format!("http://{}", addr),
        print_base_url: format!("http://{}/", addr),
        print_enabled: true,
        storage_dir: storage.path().display().to_string(),
        export_dir: export.path().display().to_string(),
        request_timeout_secs: 5,
    }
}

fn sample_record() -> ProductRecord {
    ProductRecord {
        qrcode: "https://shop.example/p/ABC123".to_string(),
        product_name: "Aspirin".to_string(),
        lot: "L-01".to_string(),
        expired_date: "2027-12-31".to_string(),
        unit_name: "Box".to_string(),
        uniq: "ABC123".to_string(),
        status: None,
    }
}

#[tokio::test]
async fn test_lookup_client_against_stub() {
    let addr = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(addr, &dir, &dir);
    let client = LookupClient::new(reqwest::Client::new(), &config);

    let data = client.fetch_product("ABC123").await.unwrap();
    assert_eq!(data.product_name.as_deref(), Some("Aspirin"));
    assert_eq!(data.retail_unit_detail.and_then(|d| d.unit).as_deref(), Some("Box"));

    let err = client.fetch_product("NOPE").await.unwrap_err();
    assert!(matches!(err, ApiError::BadStatus { status: 404, .. }));

    let err = client.fetch_product("EMPTY").await.unwrap_err();
    assert!(matches!(err, ApiError::MissingData { .. }));

    let err = client.fetch_product("GARBLED").await.unwrap_err();
    assert!(matches!(err, ApiError::JsonParseFailed { .. }));
}

#[tokio::test]
async fn test_lookup_client_connection_refused() {
    let addr = dead_addr().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(addr, &dir, &dir);
    let client = LookupClient::new(reqwest::Client::new(), &config);

    let err = client.fetch_product("ABC123").await.unwrap_err();
    assert!(matches!(err, ApiError::RequestFailed { .. }));
}

#[tokio::test]
async fn test_kiosk_appends_nothing_on_transport_or_decode_failure() {
    let addr = spawn_stub().await;
    let storage = tempfile::tempdir().unwrap();
    let export = tempfile::tempdir().unwrap();

    let mut app = App::initialize(config_for(addr, &storage, &export)).await.unwrap();
    app.run_with("x/GARBLED\n".as_bytes()).await.unwrap();
    assert!(app.table().is_empty());

    let mut app = App::initialize(config_for(dead_addr().await, &storage, &export))
        .await
        .unwrap();
    app.run_with("x/ABC123\n".as_bytes()).await.unwrap();
    assert!(app.table().is_empty());

    let store = LocalStore::open(storage.path()).unwrap();
    assert_eq!(store.get(PRODUCTS_SLOT).unwrap(), None);
}

#[tokio::test]
async fn test_print_client_against_stub() {
    let addr = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(addr, &dir, &dir);
    let client = PrintClient::new(reqwest::Client::new(), &config);

    let mut record = sample_record();
    assert_eq!(client.print_label(&record).await, PrintStatus::Done);

    record.uniq = "OTHER".to_string();
    assert_eq!(
        client.print_label(&record).await,
        PrintStatus::Failed("jammed".to_string())
    );
}

#[tokio::test]
async fn test_print_client_connection_refused() {
    let addr = dead_addr().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(addr, &dir, &dir);
    let client = PrintClient::new(reqwest::Client::new(), &config);

    let status = client.print_label(&sample_record()).await;
    assert!(status.to_string().starts_with("Failed: "));
}

#[tokio::test]
async fn test_kiosk_session_end_to_end() {
    scan_label_kiosk::utils::logging::init();

    let addr = spawn_stub().await;
    let storage = tempfile::tempdir().unwrap();
    let export = tempfile::tempdir().unwrap();
    let config = config_for(addr, &storage, &export);

    let mut app = App::initialize(config.clone()).await.unwrap();
    let input = "https://shop.example/p/ABC123\n   \nx/JAM\nx/NOPE\n:bogus\n";
    app.run_with(input.as_bytes()).await.unwrap();
    assert!(app.handle(Command::Export).await);

    let records = app.table().records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].uniq, "ABC123");
    assert_eq!(records[0].unit_name, "Box");
    assert_eq!(records[0].status, Some(PrintStatus::Done));
    assert_eq!(records[1].uniq, "JAM");
    assert_eq!(records[1].lot, "N/A");
    assert_eq!(records[1].status, Some(PrintStatus::Failed("jammed".to_string())));

    let today = chrono::Utc::now().date_naive();
    assert!(export.path().join(export_file_name(today)).exists());

    // 模拟重启
    drop(app);
    let mut app = App::initialize(config.clone()).await.unwrap();
    assert_eq!(app.table().len(), 2);
    assert_eq!(app.table().get(1).unwrap().uniq, "JAM");

    assert!(app.handle(Command::Clear).await);
    assert!(app.table().is_empty());
    let store = LocalStore::open(storage.path()).unwrap();
    assert_eq!(store.get(PRODUCTS_SLOT).unwrap(), None);

    assert!(!app.handle(Command::Quit).await);
}

#[tokio::test]
async fn test_hung_lookup_does_not_block_commands() {
    let addr = spawn_stub().await;
    let storage = tempfile::tempdir().unwrap();
    let export = tempfile::tempdir().unwrap();
    let mut config = config_for(addr, &storage, &export);
    config.request_timeout_secs = 0;

    let mut app = App::initialize(config).await.unwrap();
    let session = app.run_with("x/STALL\n:list\n:export\n:quit\n".as_bytes());
    let finished = tokio::time::timeout(Duration::from_secs(3), session).await;

    assert!(finished.is_ok(), ":quit should be handled while the lookup hangs");
    assert!(app.table().is_empty());
}

#[tokio::test]
async fn test_row_is_shown_as_printing_while_print_hangs() {
    let addr = spawn_stub().await;
    let storage = tempfile::tempdir().unwrap();
    let export = tempfile::tempdir().unwrap();
    let mut config = config_for(addr, &storage, &export);
    config.request_timeout_secs = 0;

    let mut app = App::initialize(config.clone()).await.unwrap();
    let (mut operator, input) = tokio::io::duplex(256);
    tokio::spawn(async move {
        // 第二条扫描排在挂起的打印之后，不会被处理
        operator.write_all(b"x/SLOW\nx/ABC123\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        operator.write_all(b":list\n:quit\n").await.unwrap();
    });
    let session = app.run_with(BufReader::new(input));
    let finished = tokio::time::timeout(Duration::from_secs(3), session).await;
    assert!(finished.is_ok());

    assert_eq!(app.table().len(), 1);
    assert_eq!(app.table().get(0).unwrap().uniq, "SLOW");
    assert_eq!(app.table().get(0).unwrap().status, Some(PrintStatus::Printing));
    assert!(app.render().contains("Printing..."));

    // 已持久化，重启后可见
    drop(app);
    let app = App::initialize(config).await.unwrap();
    assert_eq!(app.table().get(0).unwrap().status, Some(PrintStatus::Printing));
}

#[tokio::test]
async fn test_commands_run_while_scans_are_queued() {
    let addr = spawn_stub().await;
    let storage = tempfile::tempdir().unwrap();
    let export = tempfile::tempdir().unwrap();

    let mut app = App::initialize(config_for(addr, &storage, &export)).await.unwrap();
    // :clear 在扫描完成前就执行，之后两条扫描依次追加
    app.run_with("x/ABC123\nx/JAM\n:clear\n".as_bytes())
        .await
        .unwrap();

    let uniqs: Vec<&str> = app.table().records().iter().map(|r| r.uniq.as_str()).collect();
    assert_eq!(uniqs, vec!["ABC123", "JAM"]);
}
