//! End-to-end tests of the fetch engine against local mock servers.
//!
//! Batches run through `spawn_blocking`, the way async callers are expected
//! to drive the blocking engine.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use iexcloud_fetch::{
    FetchError, Params, RateGate, RetryBehavior, Url, UrlJsonMap, UrlSet, fetch, fetch_one,
};
use serde_json::json;
use tokio::task::spawn_blocking;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn url(server: &MockServer, route: &str) -> Url {
    Url::new(format!("{}{route}", server.uri())).unwrap()
}

async fn run(urls: UrlSet, max_connections: usize, policy: RetryBehavior) -> UrlJsonMap {
    spawn_blocking(move || fetch(&urls, max_connections, &policy))
        .await
        .unwrap()
}

async fn hits(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

/// Replies with a fixed template and records when each request arrived.
#[derive(Clone)]
struct Stamped {
    template: ResponseTemplate,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Stamped {
    fn new(template: ResponseTemplate) -> Self {
        Self {
            template,
            arrivals: Arc::default(),
        }
    }

    fn arrivals(&self) -> Vec<Instant> {
        self.arrivals.lock().unwrap().clone()
    }
}

impl Respond for Stamped {
    fn respond(&self, _: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        self.template.clone()
    }
}

fn retry_on(codes: impl IntoIterator<Item = u16>, max_retries: u32) -> RetryBehavior {
    RetryBehavior::default()
        .with_max_retries(max_retries)
        .with_responses_to_retry(codes)
        .with_timeout(Duration::from_millis(20))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_single_url_with_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .and(query_param("foo1", "bar1"))
        .and(query_param("foo2", "bar2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"args": {"foo1": "bar1", "foo2": "bar2"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let params = Params::from_pairs([("foo2", "bar2"), ("foo1", "bar1")]).unwrap();
    let target = Url::with_params(format!("{}/get", server.uri()), &params).unwrap();
    let results = run([target.clone()].into(), 0, RetryBehavior::default()).await;

    assert_eq!(results.len(), 1);
    assert_eq!(
        results.get(&target).unwrap()["args"],
        json!({"foo1": "bar1", "foo2": "bar2"})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_two_urls_in_one_batch() {
    let server = MockServer::start().await;
    for n in 1..=2 {
        Mock::given(path(format!("/get/{n}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "n": n })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let first = url(&server, "/get/1");
    let second = url(&server, "/get/2");
    let results = run([first.clone(), second.clone()].into(), 0, RetryBehavior::default()).await;

    assert!(results.is_complete());
    assert_eq!(results.get(&first), Some(&json!({"n": 1})));
    assert_eq!(results.get(&second), Some(&json!({"n": 2})));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_garbage_url_does_not_spoil_batch() {
    let server = MockServer::start().await;
    Mock::given(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let good = url(&server, "/ok");
    let garbage = Url::new("garbage_url").unwrap();
    let results = run([good.clone(), garbage.clone()].into(), 0, RetryBehavior::default()).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results.get(&good), Some(&json!([1, 2, 3])));
    assert!(results.contains_url(&garbage));
    assert!(results.get(&garbage).is_none());
    assert!(matches!(results.error(&garbage), Some(FetchError::Transport(_))));

    let err = results.into_result().unwrap_err();
    assert_eq!(err.total, 2);
    assert_eq!(err.failures.len(), 1);
    assert_eq!(err.failures[0].0, garbage);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_retries_bounded_by_max_retries() {
    let server = MockServer::start().await;
    Mock::given(path("/limited"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let target = url(&server, "/limited");
    let started = Instant::now();
    let results = run([target.clone()].into(), 0, retry_on([429], 2)).await;

    assert_eq!(hits(&server).await, 3);
    assert!(started.elapsed() >= Duration::from_millis(40));
    assert_eq!(results.error(&target).and_then(FetchError::status), Some(429));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_each_retry_waits_its_backoff() {
    let server = MockServer::start().await;
    let responder = Stamped::new(ResponseTemplate::new(429));
    Mock::given(path("/spaced"))
        .respond_with(responder.clone())
        .mount(&server)
        .await;

    let backoff = Duration::from_millis(60);
    let policy = retry_on([429], 3).with_timeout(backoff);
    run([url(&server, "/spaced")].into(), 0, policy).await;

    let arrivals = responder.arrivals();
    assert_eq!(arrivals.len(), 4);
    for pair in arrivals.windows(2) {
        assert!(pair[1] - pair[0] >= backoff);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_retry_recovers_after_throttling() {
    let server = MockServer::start().await;
    Mock::given(path("/flaky"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let target = url(&server, "/flaky");
    let results = run([target.clone()].into(), 0, retry_on([429], 3)).await;

    assert_eq!(hits(&server).await, 3);
    assert_eq!(results.get(&target), Some(&json!({"ok": true})));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unlisted_status_not_retried() {
    let server = MockServer::start().await;
    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let target = url(&server, "/missing");
    let results = run([target.clone()].into(), 0, retry_on([429], 3)).await;

    assert_eq!(hits(&server).await, 1);
    assert_eq!(results.error(&target).and_then(FetchError::status), Some(404));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_body_retried_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let target = url(&server, "/empty");
    let policy = retry_on([429], 2).with_retry_if_empty(true);
    let results = run([target.clone()].into(), 0, policy).await;

    assert_eq!(hits(&server).await, 3);
    assert!(matches!(results.error(&target), Some(FetchError::EmptyResponse)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_body_kept_when_disabled() {
    let server = MockServer::start().await;
    Mock::given(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let target = url(&server, "/empty");
    let results = run([target.clone()].into(), 0, retry_on([429], 2)).await;

    assert_eq!(hits(&server).await, 1);
    assert!(matches!(results.error(&target), Some(FetchError::EmptyResponse)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_json_not_retried() {
    let server = MockServer::start().await;
    Mock::given(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let target = url(&server, "/html");
    let policy = retry_on([429], 3).with_retry_if_empty(true);
    let results = run([target.clone()].into(), 0, policy).await;

    assert_eq!(hits(&server).await, 1);
    assert!(matches!(results.error(&target), Some(FetchError::Parse(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connection_cap_serializes_transfers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let urls: UrlSet = (0..3).map(|n| url(&server, &format!("/slow/{n}"))).collect();
    let started = Instant::now();
    let results = run(urls, 1, RetryBehavior::default()).await;

    assert!(results.is_complete());
    assert_eq!(results.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repeated_batches_on_one_thread() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("pong")))
        .mount(&server)
        .await;

    let first = url(&server, "/a");
    let second = url(&server, "/b");
    let policy = RetryBehavior::default();
    let (a, b, again) = spawn_blocking(move || {
        (
            fetch_one(&first, 0, &policy),
            fetch_one(&second, 0, &policy),
            fetch_one(&first, 0, &policy),
        )
    })
    .await
    .unwrap();

    assert_eq!(a, Some(json!("pong")));
    assert_eq!(b, Some(json!("pong")));
    assert_eq!(again, Some(json!("pong")));
    assert_eq!(hits(&server).await, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_threads_get_their_own_results() {
    let server = MockServer::start().await;
    for n in 0..8 {
        Mock::given(path(format!("/item/{n}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": n })))
            .mount(&server)
            .await;
    }

    let base = server.uri();
    let workers: Vec<_> = (0..4)
        .map(|t| {
            let base = base.clone();
            std::thread::spawn(move || {
                let mine: UrlSet = [2 * t, 2 * t + 1]
                    .into_iter()
                    .map(|n| Url::new(format!("{base}/item/{n}")).unwrap())
                    .collect();
                (t, fetch(&mine, 0, &RetryBehavior::default()))
            })
        })
        .collect();

    for worker in workers {
        let (t, results) = spawn_blocking(move || worker.join().unwrap())
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        for n in [2 * t, 2 * t + 1] {
            let target = Url::new(format!("{base}/item/{n}")).unwrap();
            assert_eq!(results.get(&target), Some(&json!({ "id": n })));
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rate_gate_spaces_batches_across_threads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(1)))
        .mount(&server)
        .await;

    let cooldown = Duration::from_millis(50);
    let gate = Arc::new(RateGate::new(
        RetryBehavior::default().with_timeout(cooldown),
    ));
    let target = url(&server, "/gated");

    let started = Instant::now();
    let workers: Vec<_> = (0..3)
        .map(|_| {
            let gate = Arc::clone(&gate);
            let target = target.clone();
            spawn_blocking(move || gate.fetch_one(&target))
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.await.unwrap(), Some(json!(1)));
    }

    assert!(started.elapsed() >= cooldown * 2);
    assert_eq!(hits(&server).await, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rate_gate_runs_batches_one_after_another() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(300);
    let responder = Stamped::new(
        ResponseTemplate::new(200)
            .set_body_json(json!(1))
            .set_delay(delay),
    );
    Mock::given(path("/slow"))
        .respond_with(responder.clone())
        .mount(&server)
        .await;

    let cooldown = Duration::from_millis(10);
    let gate = Arc::new(RateGate::new(
        RetryBehavior::default().with_timeout(cooldown),
    ));
    let target = url(&server, "/slow");

    let started = Instant::now();
    let workers: Vec<_> = (0..2)
        .map(|_| {
            let gate = Arc::clone(&gate);
            let target = target.clone();
            spawn_blocking(move || gate.fetch_one(&target))
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.await.unwrap(), Some(json!(1)));
    }

    assert!(started.elapsed() >= delay * 2);
    let arrivals = responder.arrivals();
    assert_eq!(arrivals.len(), 2);
    assert!(arrivals[1] - arrivals[0] >= delay + cooldown);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_from_async_code_fails_every_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(1)))
        .mount(&server)
        .await;

    let urls: UrlSet = [url(&server, "/a"), url(&server, "/b")].into();
    let results = fetch(&urls, 0, &RetryBehavior::default());

    assert_eq!(results.len(), 2);
    for target in &urls {
        assert!(matches!(results.error(target), Some(FetchError::Runtime(_))));
    }
    assert_eq!(hits(&server).await, 0);
    assert_eq!(fetch_one(&url(&server, "/a"), 0, &RetryBehavior::default()), None);
}
