//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full harvest cycle end-to-end.

use radar_harvest::config::{Config, CrawlerConfig, OutputConfig, RunConfiguration, SourceConfig};
use radar_harvest::crawler::{
    ConflictDecision, Coordinator, CrawlPhase, FixedDecision, SkipReason,
};
use radar_harvest::record::Symbol;
use radar_harvest::storage::{CheckpointStore, SqliteCheckpointStore};
use radar_harvest::HarvestError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        source: SourceConfig {
            base_url: base_url.to_string(),
            listing_path: "/gielda/akcje_gpw".to_string(),
            detail_prefix: "/notowania".to_string(),
        },
        crawler: CrawlerConfig {
            min_delay_ms: 0,
            max_delay_ms: 1,
            max_retries: 0,
            request_timeout_secs: 5,
        },
        output: OutputConfig {
            checkpoint_path: dir.join("checkpoint.db").display().to_string(),
            export_path: dir.join("wse.csv").display().to_string(),
        },
        ..Config::default()
    }
}

fn quick_run() -> RunConfiguration {
    RunConfiguration {
        no_wait: true,
        verbose: true,
        ..RunConfiguration::default()
    }
}

fn coordinator(
    config: &Config,
    run: RunConfiguration,
    decision: ConflictDecision,
) -> Coordinator<SqliteCheckpointStore> {
    let store = SqliteCheckpointStore::open(Path::new(&config.output.checkpoint_path))
        .expect("Failed to open checkpoint");
    Coordinator::with_resolver(config.clone(), run, store, Box::new(FixedDecision(decision)))
        .expect("Failed to create coordinator")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn listing_page(symbols: &[&str]) -> String {
    let rows: String = symbols
        .iter()
        .map(|s| format!(r#"<tr><td><a href="/notowania/{s}">{s}</a></td></tr>"#))
        .collect();
    format!(r#"<h1>Akcje GPW</h1><table>{}</table>"#, rows)
}

fn detail_page(symbol: &str, price: &str) -> String {
    format!(
        r#"<h1>Notowania {symbol} ({symbol}SA)</h1>
        <div class="profile-h1-c"><span class="q_ch_act">{price}</span></div>
        <table>
            <tr><th>Liczba akcji:</th><td><a href="/akcjonariat/{symbol}">1 000 000</a></td></tr>
            <tr><th>Kapitalizacja:</th><td>25 000 000</td></tr>
            <tr><th>C/Z</th><td class="value">12.5</td></tr>
        </table>
        <ul>
            <li><a href="/analiza/{symbol}">ANALIZA FINANSOWA</a></li>
            <li><a href="/dywidenda/{symbol}">DYWIDENDY</a></li>
        </ul>"#
    )
}

fn analysis_page(symbol: &str) -> String {
    format!(
        r#"<a href="/bilans/{symbol}">BILANS</a>
        <table>
            <tr data-field="IncomeRevenues"><td>Przychody</td><td>900</td><td>1 000</td><td></td></tr>
            <tr data-field="IncomeNetProfit"><td>Zysk netto</td><td>-50</td><td>100</td><td></td></tr>
        </table>"#
    )
}

fn balance_page() -> String {
    r#"<table>
        <tr class="bold"><td>Aktywa razem</td><td>1 200</td><td class="newest">1 500</td></tr>
        <tr class="bold"><td>Pasywa razem</td><td>1 200</td><td class="newest">1 500</td></tr>
    </table>"#
        .to_string()
}

fn dividends_page() -> String {
    r#"<table>
        <tr><th>wypłata</th><th>rok</th><th>dywidenda</th></tr>
        <tr><td>2023-06-01</td><td>2023</td><td>1.00</td></tr>
        <tr><td>2022-06-01</td><td>2022</td><td>-</td></tr>
    </table>"#
        .to_string()
}

async fn mount_listing(server: &MockServer, symbols: &[&str], expected: u64) {
    Mock::given(method("GET"))
        .and(path("/gielda/akcje_gpw"))
        .respond_with(html(&listing_page(symbols)))
        .expect(expected)
        .mount(server)
        .await;
}

/// Mounts the four pages of a symbol, each expected `expected` times
async fn mount_symbol(server: &MockServer, symbol: &str, expected: u64) {
    let pages = [
        (format!("/notowania/{}", symbol), detail_page(symbol, "25.00")),
        (format!("/analiza/{}", symbol), analysis_page(symbol)),
        (format!("/bilans/{}", symbol), balance_page()),
        (format!("/dywidenda/{}", symbol), dividends_page()),
    ];

    for (page_path, body) in pages {
        Mock::given(method("GET"))
            .and(path(page_path.as_str()))
            .respond_with(html(&body))
            .expect(expected)
            .mount(server)
            .await;
    }
}

fn read_export(config: &Config) -> String {
    std::fs::read_to_string(&config.output.export_path).expect("Failed to read export")
}

fn exported_symbols(csv: &str) -> Vec<String> {
    let mut reader = csv_reader(csv);
    reader
        .records()
        .map(|r| r.expect("Bad CSV row")[1].to_string())
        .collect()
}

fn csv_reader(csv: &str) -> csv::Reader<&[u8]> {
    csv::Reader::from_reader(csv.as_bytes())
}

fn seed(config: &Config, symbols: &[&str]) {
    let mut store = SqliteCheckpointStore::open(Path::new(&config.output.checkpoint_path))
        .expect("Failed to open checkpoint");
    for symbol in symbols {
        let record = radar_harvest::StockRecord {
            name: symbol.to_string(),
            symbol: Symbol::new(*symbol),
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            price: 1.0,
            share_count: 1,
            market_cap: 1,
            net_profit: vec![1],
            revenue: None,
            price_earnings: None,
            dividend_years: 0,
            balance_sheet: Default::default(),
        };
        store.put(&record.symbol, &record).expect("Failed to seed");
    }
}

#[tokio::test]
async fn test_full_harvest() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    mount_listing(&server, &["PKN", "CDR", "ABC", "XYZ"], 1).await;
    for symbol in ["PKN", "CDR", "ABC"] {
        mount_symbol(&server, symbol, 1).await;
    }

    // Instrument page without stock data
    Mock::given(method("GET"))
        .and(path("/notowania/XYZ"))
        .respond_with(html("<h1>Notowania XYZ</h1><p>Obligacje</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut coordinator = coordinator(&config, quick_run(), ConflictDecision::Clear);
    let summary = coordinator.run().await.expect("Harvest failed");

    assert_eq!(coordinator.phase(), CrawlPhase::Done);
    assert_eq!(summary.selected, 4);
    assert_eq!(summary.harvested.len(), 3);
    assert_eq!(
        summary.skipped,
        vec![(Symbol::new("XYZ"), SkipReason::NotApplicable)]
    );
    assert_eq!(summary.exported, 3);

    let store = coordinator.into_store();
    assert!(store.get(&Symbol::new("XYZ")).unwrap().is_none());

    let pkn = store.get(&Symbol::new("PKN")).unwrap().expect("PKN missing");
    assert_eq!(pkn.name, "PKNSA");
    assert_eq!(pkn.price, 25.0);
    assert_eq!(pkn.share_count, 1_000_000);
    assert_eq!(pkn.market_cap, 25_000_000);
    assert_eq!(pkn.net_profit, vec![100, -50]);
    assert_eq!(pkn.revenue, Some(vec![1_000, 900]));
    assert_eq!(pkn.price_earnings, Some(12.5));
    assert_eq!(pkn.dividend_years, 1);
    assert_eq!(pkn.balance_sheet.get("Aktywa razem (w tys.)"), Some(1_500));

    let csv = read_export(&config);
    assert_eq!(exported_symbols(&csv), vec!["ABC", "CDR", "PKN"]);
    let header = csv.lines().next().unwrap();
    assert!(header.ends_with("Aktywa razem (w tys.),Pasywa razem (w tys.)"));
}

#[tokio::test]
async fn test_resume_skips_checkpointed_symbols() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    seed(&config, &["ABC", "CDR"]);

    mount_listing(&server, &["ABC", "CDR", "PKN"], 1).await;
    mount_symbol(&server, "ABC", 0).await;
    mount_symbol(&server, "CDR", 0).await;
    mount_symbol(&server, "PKN", 1).await;

    let run = RunConfiguration {
        resume: true,
        ..quick_run()
    };
    // The resolver is never consulted when resuming
    let mut coordinator = coordinator(&config, run, ConflictDecision::Clear);
    let summary = coordinator.run().await.expect("Harvest failed");

    assert_eq!(summary.harvested, vec![Symbol::new("PKN")]);
    assert_eq!(summary.exported, 3);
    assert_eq!(
        exported_symbols(&read_export(&config)),
        vec!["ABC", "CDR", "PKN"]
    );
}

#[tokio::test]
async fn test_selection_takes_priority_over_checkpoint() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    seed(&config, &["ABC", "CDR"]);

    mount_listing(&server, &["ABC", "CDR", "PKN"], 1).await;
    mount_symbol(&server, "ABC", 0).await;
    mount_symbol(&server, "CDR", 1).await;
    mount_symbol(&server, "PKN", 0).await;

    let run = RunConfiguration::new(false, vec!["cdr".to_string()], true, false, Default::default())
        .unwrap();
    let mut coordinator = coordinator(&config, run, ConflictDecision::Clear);
    let summary = coordinator.run().await.expect("Harvest failed");

    assert_eq!(summary.selected, 1);
    assert_eq!(summary.harvested, vec![Symbol::new("CDR")]);

    // Selection neither prompts nor clears existing data
    let store = coordinator.into_store();
    assert_eq!(store.len().unwrap(), 2);
    let cdr = store.get(&Symbol::new("CDR")).unwrap().unwrap();
    assert_eq!(cdr.share_count, 1_000_000);
}

#[tokio::test]
async fn test_resume_after_complete_run_is_idempotent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    mount_listing(&server, &["CDR", "ABC"], 2).await;
    mount_symbol(&server, "CDR", 1).await;
    mount_symbol(&server, "ABC", 1).await;

    coordinator(&config, quick_run(), ConflictDecision::Clear)
        .run()
        .await
        .expect("First harvest failed");
    let first_export = read_export(&config);

    let run = RunConfiguration {
        resume: true,
        ..quick_run()
    };
    let summary = coordinator(&config, run, ConflictDecision::Clear)
        .run()
        .await
        .expect("Resumed harvest failed");

    assert_eq!(summary.selected, 0);
    assert!(summary.harvested.is_empty());
    assert_eq!(read_export(&config), first_export);
    // Mock expectations (one listing fetch per run, one fetch per page)
    // are verified when the server is dropped
}

#[tokio::test]
async fn test_clear_decision_discards_previous_data() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    seed(&config, &["OLD"]);

    mount_listing(&server, &["ABC"], 1).await;
    mount_symbol(&server, "ABC", 1).await;

    let mut coordinator = coordinator(&config, quick_run(), ConflictDecision::Clear);
    coordinator.run().await.expect("Harvest failed");

    let keys: Vec<_> = coordinator.into_store().keys().unwrap().into_iter().collect();
    assert_eq!(keys, vec![Symbol::new("ABC")]);
}

#[tokio::test]
async fn test_resume_decision_keeps_previous_data() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    seed(&config, &["ABC"]);

    mount_listing(&server, &["ABC", "CDR"], 1).await;
    mount_symbol(&server, "ABC", 0).await;
    mount_symbol(&server, "CDR", 1).await;

    let mut coordinator = coordinator(&config, quick_run(), ConflictDecision::Resume);
    let summary = coordinator.run().await.expect("Harvest failed");

    assert_eq!(summary.harvested, vec![Symbol::new("CDR")]);
    assert_eq!(coordinator.into_store().len().unwrap(), 2);
}

#[tokio::test]
async fn test_failed_secondary_page_skips_symbol() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    mount_listing(&server, &["ABC", "CDR"], 1).await;
    mount_symbol(&server, "CDR", 1).await;

    // ABC: balance sheet page is gone
    for (page_path, body) in [
        ("/notowania/ABC", detail_page("ABC", "3.10")),
        ("/analiza/ABC", analysis_page("ABC")),
    ] {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(html(&body))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/bilans/ABC"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut coordinator = coordinator(&config, quick_run(), ConflictDecision::Clear);
    let summary = coordinator.run().await.expect("Harvest failed");

    assert_eq!(summary.harvested, vec![Symbol::new("CDR")]);
    assert_eq!(summary.skipped.len(), 1);
    assert!(matches!(
        &summary.skipped[0].1,
        SkipReason::Fetch { detail, .. } if detail == "HTTP 404"
    ));
    assert_eq!(exported_symbols(&read_export(&config)), vec!["CDR"]);
}

#[tokio::test]
async fn test_missing_revenue_row_degrades_to_absent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    mount_listing(&server, &["ABC"], 1).await;
    let analysis_without_revenue = r#"<a href="/bilans/ABC">BILANS</a>
        <table>
            <tr data-field="IncomeNetProfit"><td>Zysk netto</td><td>7</td><td></td></tr>
        </table>"#;
    for (page_path, body) in [
        ("/notowania/ABC", detail_page("ABC", "3.10").replace("C/Z", "EV")),
        ("/analiza/ABC", analysis_without_revenue.to_string()),
        ("/bilans/ABC", balance_page()),
        ("/dywidenda/ABC", dividends_page()),
    ] {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(html(&body))
            .mount(&server)
            .await;
    }

    let mut coordinator = coordinator(&config, quick_run(), ConflictDecision::Clear);
    coordinator.run().await.expect("Harvest failed");

    let abc = coordinator
        .into_store()
        .get(&Symbol::new("ABC"))
        .unwrap()
        .expect("ABC missing");
    assert_eq!(abc.net_profit, vec![7]);
    assert_eq!(abc.revenue, None);
    assert_eq!(abc.price_earnings, None);
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/gielda/akcje_gpw"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut coordinator = coordinator(&config, quick_run(), ConflictDecision::Clear);
    let result = coordinator.run().await;

    assert!(matches!(
        result,
        Err(HarvestError::ListingStatus { status: 503, .. })
    ));
    assert!(!Path::new(&config.output.export_path).exists());
}
