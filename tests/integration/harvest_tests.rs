//! Fetch unit and harvest loop tests against mock quote APIs

use bonjourr_quotes::config::UserAgentConfig;
use bonjourr_quotes::harvest::{
    build_http_client, fetch_from_source, FetchError, HarvestSettings, Harvester, HttpFetcher,
    QuoteFetcher, SourceOutcome,
};
use bonjourr_quotes::{Extractor, Quote, Source, SourceRegistry};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn test_client() -> reqwest::Client {
    build_http_client(&UserAgentConfig::default(), Duration::from_secs(5))
        .expect("Failed to build client")
}

fn hitokoto_source(server: &MockServer, name: &str, route: &str) -> Source {
    let url = Url::parse(&format!("{}{}", server.uri(), route)).expect("Failed to parse URL");
    Source::new(name, url, Extractor::Hitokoto)
}

fn fetcher_for(sources: Vec<Source>, max_length: Option<usize>) -> HttpFetcher {
    HttpFetcher::new(
        test_client(),
        SourceRegistry::new(sources),
        max_length,
        true,
    )
}

fn settings(target: usize, max_consecutive_failures: u32) -> HarvestSettings {
    HarvestSettings {
        target,
        max_workers: 3,
        max_consecutive_failures,
        batch_margin: 2,
    }
}

#[tokio::test]
async fn test_fetch_accepts_quote() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hitokoto"))
        .and(query_param("c", "d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hitokoto": "  海内存知己，天涯若比邻。 ",
            "from": "王勃"
        })))
        .mount(&mock_server)
        .await;

    let source = hitokoto_source(&mock_server, "一言", "/hitokoto").param("c", "d");
    let outcome = fetch_from_source(&test_client(), &source, Some(15)).await;

    match outcome {
        SourceOutcome::Accepted(quote) => {
            assert_eq!(quote, Quote::new("海内存知己，天涯若比邻。", "王勃"));
        }
        other => panic!("Expected accepted quote, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_status_and_json_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let client = test_client();

    let broken = hitokoto_source(&mock_server, "broken", "/broken");
    assert!(matches!(
        fetch_from_source(&client, &broken, None).await,
        SourceOutcome::Failed(FetchError::Status(500))
    ));

    let garbage = hitokoto_source(&mock_server, "garbage", "/garbage");
    assert!(matches!(
        fetch_from_source(&client, &garbage, None).await,
        SourceOutcome::Failed(FetchError::Json(_))
    ));
}

#[tokio::test]
async fn test_empty_text_counts_one_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "hitokoto": "", "from": "nobody" })),
        )
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(vec![hitokoto_source(&mock_server, "empty", "/empty")], None);
    let attempt = fetcher.fetch_one(0).await;

    assert!(attempt.quote.is_none());
    let tally = attempt.stats.get("empty").expect("empty source tallied");
    assert_eq!(tally.failure, 1);
    assert_eq!(tally.success, 0);
}

#[tokio::test]
async fn test_too_long_is_counted_separately() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/long"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hitokoto": "人生若只如初见，何事秋风悲画扇。",
            "from": "纳兰性德"
        })))
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(vec![hitokoto_source(&mock_server, "long", "/long")], Some(5));
    let attempt = fetcher.fetch_one(0).await;

    assert!(attempt.quote.is_none());
    let tally = attempt.stats.get("long").expect("long source tallied");
    assert_eq!(tally.too_long, 1);
    assert_eq!(tally.failure, 0);
}

#[tokio::test]
async fn test_unit_falls_through_to_next_source() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hitokoto": "落霞与孤鹜齐飞",
            "from": "王勃"
        })))
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(
        vec![
            hitokoto_source(&mock_server, "down", "/down"),
            hitokoto_source(&mock_server, "up", "/up"),
        ],
        None,
    );
    let attempt = fetcher.fetch_one(0).await;

    let fetched = attempt.quote.expect("fell through to second source");
    assert_eq!(fetched.source, "up");
    assert_eq!(fetched.quote.text, "落霞与孤鹜齐飞");
    assert_eq!(attempt.stats.get("down").map(|t| t.failure), Some(1));
    assert_eq!(attempt.stats.get("up").map(|t| t.success), Some(1));
}

#[tokio::test]
async fn test_harvest_reaches_exact_target() {
    let mock_server = MockServer::start().await;
    let counter = Arc::new(AtomicUsize::new(0));
    let responder_counter = Arc::clone(&counter);

    Mock::given(method("GET"))
        .and(path("/endless"))
        .respond_with(move |_: &Request| {
            let n = responder_counter.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hitokoto": format!("第{}句", n),
                "from": "测试"
            }))
        })
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(
        vec![hitokoto_source(&mock_server, "endless", "/endless")],
        None,
    );
    let harvester = Harvester::new(Arc::new(fetcher), settings(10, 5));
    let mut rng = StdRng::seed_from_u64(7);

    let outcome = harvester.run(HashSet::new(), &mut rng).await;

    assert_eq!(outcome.quotes.len(), 10);
    assert!(!outcome.exhausted);
    let keys: HashSet<_> = outcome.quotes.iter().map(|f| f.quote.key()).collect();
    assert_eq!(keys.len(), 10);
    assert!(counter.load(Ordering::SeqCst) >= 10);
}

#[tokio::test]
async fn test_harvest_stops_when_sources_keep_failing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(
        vec![
            hitokoto_source(&mock_server, "a", "/a"),
            hitokoto_source(&mock_server, "b", "/b"),
        ],
        None,
    );
    let harvester = Harvester::new(Arc::new(fetcher), settings(5, 3));
    let mut rng = StdRng::seed_from_u64(1);

    let outcome = harvester.run(HashSet::new(), &mut rng).await;

    assert!(outcome.quotes.is_empty());
    assert!(outcome.exhausted);
    assert_eq!(outcome.rounds, 3);
    assert_eq!(outcome.stats.totals().success, 0);
    assert!(outcome.stats.totals().failure > 0);
}
