//! End-to-end pipeline runs against a mock ad site

use adsweep::config::{load_config, Config};
use adsweep::crawler::Coordinator;
use adsweep::output::detect_outliers;
use adsweep::{AdsweepError, AttributeValue};
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A configuration with no waiting anywhere
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.fetcher.max_retries = 2;
    config.fetcher.initial_backoff_ms = 1;
    config.crawler.page_delay_ms = 0;
    config.scheduler.concurrency = 2;
    config.scheduler.batch_delay_ms = 0;
    config
}

fn card(id: u32) -> String {
    format!(
        r#"<div class="postListItem">
             <div class="imageGallery"><img src="/img/{id}.jpg"></div>
             <div class="postDetails"><a href="/ad/{id}?utm_source=serp"><h2>Car {id}</h2></a></div>
           </div>"#
    )
}

fn results_page(ids: &[u32], tail: &str, next: Option<&str>) -> String {
    let cards: String = ids.iter().map(|id| card(*id)).collect();
    let pagination = next
        .map(|href| {
            format!(r#"<div id="pagination"><a data-id="nextPageArrow" href="{href}">&rsaquo;</a></div>"#)
        })
        .unwrap_or_default();

    format!(
        r#"<html><body>
             <div id="serpMainContent">{cards}{tail}</div>
             {pagination}
           </body></html>"#
    )
}

fn detail_page(price: &str, fields: &str) -> String {
    format!(
        r#"<html><body>
             <div data-id="post_price">{price}</div>
             <div data-id="description">Clean car.</div>
             <ul>{fields}</ul>
           </body></html>"#
    )
}

async fn mount_html(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_run_two_pages_with_marker() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    // Page 2 is more specific, so it is mounted first
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(
            &[3, 4],
            &format!("<h3>Recommended Ads</h3>{}", card(99)),
            Some("/search?page=3"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[5], "", None)))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(
            &[1, 2, 3],
            "",
            Some("/search?page=2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    mount_html(
        &server,
        "/ad/1",
        detail_page(
            "12,000 JOD",
            r#"<li data-id="singeInfoField_1"><p>Make</p><span class="font-bold">Toyota</span></li>
               <li data-id="singeInfoField_2" class="fullRow"><p>Interior Options</p><div class="fullValue">Leather, Sunroof</div></li>"#,
        ),
    )
    .await;

    // Ad 2 recovers after one unavailable response
    Mock::given(method("GET"))
        .and(path("/ad/2"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_html(&server, "/ad/2", detail_page("15,000 JOD", "")).await;

    Mock::given(method("GET"))
        .and(path("/ad/3"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    mount_html(&server, "/ad/4", detail_page("0", "")).await;

    Mock::given(method("GET"))
        .and(path("/ad/99"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(create_test_config()).unwrap();
    let report = coordinator
        .run(&format!("{}/search", base_url))
        .await
        .expect("run should succeed");

    let run = &report.run;
    assert_eq!(run.total_items, 2);
    assert_eq!(run.items.len(), 2);
    assert_eq!(run.min_price, Some(Decimal::from(12_000)));
    assert_eq!(run.avg_price, Some(Decimal::from(13_500)));
    assert_eq!(run.max_price, Some(Decimal::from(15_000)));

    let first = &run.items[0];
    assert_eq!(first.url().as_str(), format!("{}/ad/1", base_url));
    assert_eq!(first.summary.title, "Car 1");
    assert_eq!(first.summary.thumbnail_url, format!("{}/img/1.jpg", base_url));
    assert_eq!(first.detail.description, "Clean car.");
    assert_eq!(
        first.detail.attributes.get("Interior Options"),
        Some(&AttributeValue::List(vec![
            "Leather".to_string(),
            "Sunroof".to_string()
        ]))
    );
    assert_eq!(run.items[1].summary.title, "Car 2");

    assert_eq!(report.metrics.pages_fetched, 2);
    assert_eq!(report.metrics.listings_discovered, 4);
    assert_eq!(report.metrics.detail_failures, 1);
    assert_eq!(report.metrics.dropped_without_price, 2);

    let json = serde_json::to_value(run).unwrap();
    assert_eq!(json["totalItems"], 2);
    assert_eq!(json["items"][0]["rawPriceText"], "12,000 JOD");
    assert_eq!(json["items"][0]["attributes"]["Make"], "Toyota");
}

#[tokio::test]
async fn test_pagination_failure_fails_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(
            &[1],
            "",
            Some("/search?page=2"),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ad/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(create_test_config()).unwrap();
    let err = coordinator
        .run(&format!("{}/search", server.uri()))
        .await
        .unwrap_err();

    match err {
        AdsweepError::Pagination { url, source } => {
            assert!(url.ends_with("/search?page=2"));
            assert_eq!(source.status(), Some(500));
        }
        other => panic!("expected Pagination error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_outliers_over_run_items() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/search",
        results_page(&[1, 2, 3, 4, 5], "", None),
    )
    .await;
    for (id, price) in [(1, "100"), (2, "110"), (3, "120"), (4, "130"), (5, "10,000")] {
        mount_html(&server, &format!("/ad/{}", id), detail_page(price, "")).await;
    }

    let coordinator = Coordinator::new(create_test_config()).unwrap();
    let report = coordinator
        .run(&format!("{}/search", server.uri()))
        .await
        .unwrap();

    assert_eq!(report.run.total_items, 5);
    let outliers = detect_outliers(&report.run.items);
    assert_eq!(outliers.len(), 1);
    assert!(outliers.contains(report.run.items[4].url()));
}

#[tokio::test]
async fn test_run_with_config_file() {
    let server = MockServer::start().await;

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[fetcher]
max-retries = 0

[crawler]
page-delay-ms = 0

[scheduler]
concurrency = 1
batch-delay-ms = 0

[markup]
termination-marker = "Sponsored"
"#
    )
    .unwrap();
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.markup.termination_marker, "Sponsored");

    mount_html(
        &server,
        "/search",
        results_page(&[1], &format!("<p>Sponsored</p>{}", card(2)), Some("/search?page=2")),
    )
    .await;
    mount_html(&server, "/ad/1", detail_page("2,500", "")).await;

    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator
        .run(&format!("{}/search", server.uri()))
        .await
        .unwrap();

    assert_eq!(report.metrics.pages_fetched, 1);
    assert_eq!(report.run.total_items, 1);
    assert_eq!(report.run.avg_price, Some(Decimal::from(2500)));
}
