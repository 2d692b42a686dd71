use async_trait::async_trait;
use sku_exist_check::browser::launch_browser;
use sku_exist_check::config::Config;
use sku_exist_check::error::{FetchError, SessionError};
use sku_exist_check::infrastructure::{ChromiumSession, HttpSession, Session, SessionPool};
use sku_exist_check::models::{load_input_table, ClassificationMode, ClassificationOutcome, Marker};
use sku_exist_check::services::ReportWriter;
use sku_exist_check::{Dispatcher, SkuFlow};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// 按 SKU 返回预设页面的假会话
#[derive(Clone)]
struct FakeSite {
    pages: Arc<HashMap<String, Result<String, FetchError>>>,
    current: String,
}

impl FakeSite {
    fn new(pages: Vec<(&str, Result<String, FetchError>)>) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(sku, page)| (sku.to_string(), page))
                    .collect(),
            ),
            current: String::new(),
        }
    }
}

#[async_trait]
impl Session for FakeSite {
    async fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        let sku = url.rsplit("q=").next().unwrap_or_default();
        let page = self.pages.get(sku).cloned().unwrap_or_else(|| Ok(String::new()));
        self.current = page?;
        Ok(())
    }

    async fn has_any(&mut self, markers: &[&Marker]) -> Result<bool, FetchError> {
        let document = scraper::Html::parse_document(&self.current);
        Ok(markers.iter().any(|m| m.is_present(&document)))
    }

    async fn html(&mut self) -> Result<String, FetchError> {
        Ok(self.current.clone())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        Ok(())
    }
}

fn results_page(items: usize) -> String {
    let items: String = (0..items)
        .map(|i| format!(r#"<li class="product-item">Product {}</li>"#, i))
        .collect();
    format!(r#"<html><body><ol id="amasty-shopby-product-list">{}</ol></body></html>"#, items)
}

fn no_results_page(sku: &str) -> String {
    format!(
        r#"<html><body><div class="nxt-nrf-container">Your search - {} - did not match any products.</div></body></html>"#,
        sku
    )
}

fn config(mode: ClassificationMode) -> Config {
    Config {
        search_url: "https://shop.example.com/nsearch".to_string(),
        mode,
        wait_timeout_secs: 1,
        poll_interval_ms: 50,
        ..Config::default()
    }
}

fn pool(size: usize, site: &FakeSite) -> SessionPool<FakeSite> {
    SessionPool::from_sessions((0..size).map(|_| site.clone()).collect())
}

fn dispatcher(config: &Config) -> Dispatcher {
    Dispatcher::new(
        Arc::new(SkuFlow::from_config(config).unwrap()),
        config.request_delay(),
    )
}

fn render(config: &Config, headers: &[String], records: &[sku_exist_check::ResultRecord]) -> Vec<String> {
    let mut buffer = Vec::new();
    ReportWriter::new("unused.csv", config.mode)
        .write_to(&mut buffer, headers, records)
        .unwrap();
    String::from_utf8(buffer)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_found_and_not_found_end_to_end() {
    let config = config(ClassificationMode::FourWay);
    let site = FakeSite::new(vec![
        ("ABC123", Ok(results_page(2))),
        ("XYZ999", Ok(no_results_page("XYZ999"))),
    ]);
    let pool = pool(2, &site);
    let rows = vec![
        sku_exist_check::SkuRow::from_sku(0, "ABC123"),
        sku_exist_check::SkuRow::from_sku(1, "XYZ999"),
    ];

    let outcome = dispatcher(&config).run_all(&pool, rows).await;
    pool.release_all().await.unwrap();

    assert_eq!(outcome.records.len(), 2);
    let lines = render(&config, &["Item Code".to_string()], &outcome.records);
    assert_eq!(lines[0], "Item Code,No Results Found,Product Count,Error");
    assert_eq!(lines[1], "ABC123,false,2,");
    assert_eq!(lines[2], "XYZ999,true,0,");
}

#[tokio::test]
async fn test_transport_error_is_isolated() {
    let config = config(ClassificationMode::FourWay);
    let site = FakeSite::new(vec![
        ("ABC123", Ok(results_page(1))),
        (
            "BROKEN",
            Err(FetchError::Navigation {
                url: "https://shop.example.com/nsearch?q=BROKEN".to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            }),
        ),
        ("XYZ999", Ok(no_results_page("XYZ999"))),
    ]);
    let pool = pool(3, &site);
    let rows = ["ABC123", "BROKEN", "XYZ999"]
        .iter()
        .enumerate()
        .map(|(i, sku)| sku_exist_check::SkuRow::from_sku(i, *sku))
        .collect();

    let outcome = dispatcher(&config).run_all(&pool, rows).await;

    let by_sku: HashMap<&str, &ClassificationOutcome> = outcome
        .records
        .iter()
        .map(|r| (r.sku(), &r.outcome))
        .collect();
    assert_eq!(by_sku["ABC123"], &ClassificationOutcome::Found { count: Some(1) });
    assert_eq!(by_sku["XYZ999"], &ClassificationOutcome::NotFound);
    let broken = by_sku["BROKEN"];
    assert!(broken.is_error());
    assert_eq!(broken.exists(), None);
    assert!(broken
        .error_message()
        .unwrap()
        .contains("ERR_CONNECTION_REFUSED"));
}

#[tokio::test]
async fn test_csv_in_csv_out_keeps_rows_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("products.csv");
    let output = dir.path().join("results.csv");
    std::fs::write(
        &input,
        "Name,Item Code,Price\nTent,ABC123,499\nStove,XYZ999,89\nMystery,,0\nMat,ABC123,49\n",
    )
    .unwrap();

    let config = config(ClassificationMode::FourWay);
    let table = load_input_table(&input, &config.sku_column).await.unwrap();
    let site = FakeSite::new(vec![
        ("ABC123", Ok(results_page(3))),
        ("XYZ999", Ok(no_results_page("XYZ999"))),
    ]);
    let pool = pool(2, &site);

    let outcome = dispatcher(&config).run_all(&pool, table.rows.clone()).await;
    pool.release_all().await.unwrap();
    ReportWriter::new(&output, config.mode)
        .write(&table.headers, &outcome.records)
        .await
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Name,Item Code,Price,No Results Found,Product Count,Error");
    assert!(lines[1].starts_with("Tent,ABC123,499,false,3,"));
    assert_eq!(lines[2], "Stove,XYZ999,89,true,0,");
    assert!(lines[3].starts_with("Mystery,,0,,,"));
    assert_eq!(lines[4], "Mat,ABC123,49,false,3,");
}

#[tokio::test]
async fn test_wide_csv_row_keeps_result_columns_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("products.csv");
    let output = dir.path().join("results.csv");
    std::fs::write(&input, "Item Code,Note\nA1,x,extra\nB2,y\n").unwrap();

    let config = config(ClassificationMode::FourWay);
    let table = load_input_table(&input, &config.sku_column).await.unwrap();
    let site = FakeSite::new(vec![
        ("A1", Ok(no_results_page("A1"))),
        ("B2", Ok(results_page(1))),
    ]);
    let pool = pool(1, &site);

    let outcome = dispatcher(&config).run_all(&pool, table.rows.clone()).await;
    pool.release_all().await.unwrap();
    ReportWriter::new(&output, config.mode)
        .write(&table.headers, &outcome.records)
        .await
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines[0],
        "Item Code,Note,Unnamed: 2,No Results Found,Product Count,Error"
    );
    assert_eq!(lines[1], "A1,x,extra,true,0,");
    assert_eq!(lines[2], "B2,y,,false,1,");
}

#[tokio::test]
async fn test_xlsx_in_xlsx_out() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("products.xlsx");
    let output = dir.path().join("results.xlsx");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Item Code").unwrap();
    sheet.write_string(0, 1, "Name").unwrap();
    sheet.write_number(1, 0, 12345.0).unwrap();
    sheet.write_string(1, 1, "Tent").unwrap();
    sheet.write_string(2, 0, "XYZ999").unwrap();
    sheet.write_string(2, 1, "Stove").unwrap();
    workbook.save(&input).unwrap();

    let config = config(ClassificationMode::FourWay);
    let table = load_input_table(&input, &config.sku_column).await.unwrap();
    assert_eq!(table.rows[0].sku, "12345");

    let site = FakeSite::new(vec![
        ("12345", Ok(results_page(4))),
        ("XYZ999", Ok(no_results_page("XYZ999"))),
    ]);
    let pool = pool(2, &site);
    let outcome = dispatcher(&config).run_all(&pool, table.rows.clone()).await;
    pool.release_all().await.unwrap();
    ReportWriter::new(&output, config.mode)
        .write(&table.headers, &outcome.records)
        .await
        .unwrap();

    let written = load_input_table(&output, &config.sku_column).await.unwrap();
    assert_eq!(
        written.headers,
        vec!["Item Code", "Name", "No Results Found", "Product Count", "Error"]
    );
    assert_eq!(written.rows[0].fields, vec!["12345", "Tent", "false", "4", ""]);
    assert_eq!(written.rows[1].fields, vec!["XYZ999", "Stove", "true", "0", ""]);
}

#[tokio::test]
async fn test_existence_only_mode() {
    let config = config(ClassificationMode::ExistenceOnly);
    let site = FakeSite::new(vec![
        ("ABC123", Ok(results_page(0))),
        (
            "TITLE1",
            Ok(r#"<div class="page-title-wrapper"><h1>Search results</h1></div>"#.to_string()),
        ),
        ("XYZ999", Ok(no_results_page("XYZ999"))),
    ]);
    let pool = pool(1, &site);
    let rows = ["ABC123", "TITLE1", "XYZ999"]
        .iter()
        .enumerate()
        .map(|(i, sku)| sku_exist_check::SkuRow::from_sku(i, *sku))
        .collect();

    let outcome = dispatcher(&config).run_all(&pool, rows).await;
    let lines = render(&config, &["Item Code".to_string()], &outcome.records);

    assert_eq!(lines[0], "Item Code,Product Exists,Error");
    assert_eq!(lines[1], "ABC123,true,");
    assert_eq!(lines[2], "TITLE1,true,");
    assert_eq!(lines[3], "XYZ999,false,");
}

#[tokio::test]
#[ignore] // 需要本机安装 Chromium 并能访问网络：cargo test -- --ignored
async fn test_live_browser_search() {
    let config = Config::default();
    let host = launch_browser(true, None).await.expect("启动浏览器失败");
    let page = host.new_page(0).await.expect("创建页面失败");
    let pool = SessionPool::from_sessions(vec![ChromiumSession::new(
        0,
        page,
        config.navigation_timeout(),
    )]);

    let outcome = dispatcher(&config)
        .run_all(&pool, vec![sku_exist_check::SkuRow::from_sku(0, "ZZZ-NO-SUCH-SKU-000")])
        .await;

    pool.release_all().await.expect("释放会话失败");
    host.shutdown().await.expect("关闭浏览器失败");

    assert_eq!(outcome.records.len(), 1);
    assert!(!outcome.records[0].outcome.is_error());
}

#[tokio::test]
#[ignore] // 需要访问网络：cargo test -- --ignored
async fn test_live_http_search() {
    let config = Config::default();
    let session = HttpSession::new(0, &config.user_agent, Duration::from_secs(30))
        .expect("创建 HTTP 会话失败");
    let pool = SessionPool::from_sessions(vec![session]);

    let outcome = dispatcher(&config)
        .run_all(&pool, vec![sku_exist_check::SkuRow::from_sku(0, "tent")])
        .await;
    pool.release_all().await.expect("释放会话失败");

    assert_eq!(outcome.records.len(), 1);
}
