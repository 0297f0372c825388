//! End-to-end tests: config, harvest, merge, persist, report

use bonjourr_quotes::config::{load_config, Config, HarvestConfig, OutputConfig, SourceEntry};
use bonjourr_quotes::harvest::harvest;
use bonjourr_quotes::output::{write_run_report, RunReport};
use bonjourr_quotes::store::StoreError;
use bonjourr_quotes::{Extractor, Quote, QuoteError, QuoteStore, RunMode, SourceRegistry};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::{tempdir, NamedTempFile};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Creates a single-source test configuration against `server`
fn create_test_config(server: &MockServer, csv_path: &Path, target: usize, mode: RunMode) -> Config {
    Config {
        harvest: HarvestConfig {
            target_count: target,
            max_workers: 1,
            request_timeout_secs: 5,
            max_length: 0,
            max_consecutive_failures: 5,
            batch_margin: 0,
            wrap_around: true,
            mode,
        },
        output: OutputConfig {
            csv_path: csv_path.display().to_string(),
            ..OutputConfig::default()
        },
        sources: vec![SourceEntry {
            name: "mock".to_string(),
            url: format!("{}/quote", server.uri()),
            params: BTreeMap::new(),
            extractor: Extractor::Hitokoto,
        }],
        ..Config::default()
    }
}

/// Mounts a responder that serves `quotes` in order, then repeats the last one
async fn mount_sequence(server: &MockServer, quotes: Vec<(&'static str, &'static str)>) {
    let counter = Arc::new(AtomicUsize::new(0));

    Mock::given(method("GET"))
        .and(path("/quote"))
        .respond_with(move |_: &Request| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let (text, author) = quotes[n.min(quotes.len() - 1)];
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "hitokoto": text, "from": author }))
        })
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_append_run_grows_store() {
    let mock_server = MockServer::start().await;
    mount_sequence(&mock_server, vec![("y", "B"), ("z", "C"), ("x", "A")]).await;

    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("quotes.csv");
    std::fs::write(&csv_path, "text,author\nx,A\n").unwrap();

    let config = create_test_config(&mock_server, &csv_path, 2, RunMode::Append);
    let mut rng = StdRng::seed_from_u64(3);

    let mut store = QuoteStore::load(&csv_path).unwrap();
    let outcome = harvest(&config, store.keys(), &mut rng).await.unwrap();

    assert_eq!(outcome.quotes.len(), 2);
    assert!(!outcome.exhausted);

    let merge = store.merge(outcome.new_quotes(), config.harvest.mode, &mut rng);
    store.save(&csv_path).unwrap();

    assert_eq!(merge.added, 2);
    assert_eq!(merge.removed, 0);

    let reloaded = QuoteStore::load(&csv_path).unwrap();
    assert_eq!(reloaded.len(), 3);
    assert!(reloaded.contains(&Quote::new("x", "A")));
    assert!(reloaded.contains(&Quote::new("y", "B")));
    assert!(reloaded.contains(&Quote::new("z", "C")));
}

#[tokio::test]
async fn test_single_new_quote_appended_to_two_existing() {
    let mock_server = MockServer::start().await;
    mount_sequence(&mock_server, vec![("z", "C")]).await;

    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("quotes.csv");
    std::fs::write(&csv_path, "text,author\nx,A\ny,B\n").unwrap();

    let config = create_test_config(&mock_server, &csv_path, 1, RunMode::Append);
    let mut rng = StdRng::seed_from_u64(9);

    let mut store = QuoteStore::load(&csv_path).unwrap();
    let outcome = harvest(&config, store.keys(), &mut rng).await.unwrap();
    store.merge(outcome.new_quotes(), config.harvest.mode, &mut rng);
    store.save(&csv_path).unwrap();

    assert_eq!(outcome.new_quotes(), vec![Quote::new("z", "C")]);
    assert_eq!(QuoteStore::load(&csv_path).unwrap().len(), 3);
}

#[tokio::test]
async fn test_rotate_run_keeps_store_size() {
    let mock_server = MockServer::start().await;
    mount_sequence(&mock_server, vec![("new one", "N"), ("new two", "N")]).await;

    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("quotes.csv");
    std::fs::write(&csv_path, "text,author\nold 1,O\nold 2,O\nold 3,O\n").unwrap();

    let config = create_test_config(&mock_server, &csv_path, 2, RunMode::Rotate);
    let mut rng = StdRng::seed_from_u64(11);

    let mut store = QuoteStore::load(&csv_path).unwrap();
    let outcome = harvest(&config, store.keys(), &mut rng).await.unwrap();
    let merge = store.merge(outcome.new_quotes(), config.harvest.mode, &mut rng);

    assert_eq!(merge.added, 2);
    assert_eq!(merge.removed, 2);
    assert_eq!(store.len(), 3);
    assert!(store.contains(&Quote::new("new one", "N")));
    assert!(store.contains(&Quote::new("new two", "N")));
}

#[tokio::test]
async fn test_existing_quotes_exhaust_the_run() {
    let mock_server = MockServer::start().await;
    mount_sequence(&mock_server, vec![("x", "A")]).await;

    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("quotes.csv");
    std::fs::write(&csv_path, "text,author\nx,A\n").unwrap();

    let config = create_test_config(&mock_server, &csv_path, 1, RunMode::Rotate);
    let mut rng = StdRng::seed_from_u64(5);

    let store = QuoteStore::load(&csv_path).unwrap();
    let outcome = harvest(&config, store.keys(), &mut rng).await.unwrap();

    assert!(outcome.quotes.is_empty());
    assert!(outcome.exhausted);
    assert_eq!(outcome.rounds, 5);
}

#[test]
fn test_csv_file_roundtrip_with_special_characters() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("nested").join("quotes.csv");

    let store = QuoteStore::from_quotes(vec![
        Quote::new("他说：\"你好, 世界\"", "某人"),
        Quote::new("第一行\n第二行", "佚名"),
        Quote::new("plain", "author"),
    ]);
    store.save(&csv_path).unwrap();

    let reloaded = QuoteStore::load(&csv_path).unwrap();
    assert_eq!(reloaded.len(), 3);
    for quote in store.iter() {
        assert!(reloaded.contains(quote), "missing {:?}", quote);
    }
}

#[test]
fn test_legacy_headerless_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "李白,床前明月光\r\n杜甫,国破山河在\r\n").unwrap();

    let store = QuoteStore::load(file.path()).unwrap();

    assert_eq!(store.len(), 2);
    assert!(store.contains(&Quote::new("床前明月光", "李白")));
}

#[test]
fn test_invalid_utf8_maps_to_encoding_exit_code() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&[0x74, 0x65, 0xff, 0xfe, 0x0a]).unwrap();

    let err = QuoteStore::load(file.path()).unwrap_err();
    assert!(matches!(err, StoreError::Encoding { .. }));
    assert_eq!(QuoteError::from(err).exit_code(), 3);
}

#[test]
fn test_missing_file_is_empty_store() {
    let dir = tempdir().unwrap();
    let store = QuoteStore::load(&dir.path().join("absent.csv")).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_config_file_sources() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[harvest]
target-count = 3
max-length = 20

[[source]]
name = "一言"
url = "https://v1.hitokoto.cn/"
params = {{ c = ["a", "b"], max_length = 20 }}
extractor = {{ kind = "hitokoto" }}

[[source]]
name = "custom"
url = "https://example.com/api"
extractor = {{ kind = "pointer", text = "/result/text" }}
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    let registry = SourceRegistry::from_config(&config).unwrap();

    assert_eq!(config.harvest.target_count, 3);
    assert_eq!(registry.len(), 2);

    let url = registry.get(0).unwrap().request_url();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("c".to_string(), "a".to_string())));
    assert!(pairs.contains(&("c".to_string(), "b".to_string())));
    assert!(pairs.contains(&("max_length".to_string(), "20".to_string())));
}

#[test]
fn test_summary_file_appends() {
    let dir = tempdir().unwrap();
    let summary = dir.path().join("step_summary.md");

    write_run_report(&RunReport::default(), &summary).unwrap();
    write_run_report(&RunReport::default(), &summary).unwrap();

    let content = std::fs::read_to_string(&summary).unwrap();
    assert_eq!(content.matches("语录自动更新报告").count(), 2);
}

#[test]
fn test_shipped_sample_config_declares_every_source() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("quotes.toml");

    let config = load_config(&path).unwrap();
    let registry = SourceRegistry::from_config(&config).unwrap();
    let names: Vec<&str> = registry.names().collect();

    assert_eq!(registry.len(), 6);
    assert_eq!(names[0], "一言（官方-动画）");
    assert!(names.contains(&"今日诗词"));
    assert_eq!(config.harvest.target_count, 15);
    assert_eq!(config.readme.repository, "rksk102/bonjourr-chinese-quotes");
}
