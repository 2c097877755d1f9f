//! End-to-end tests for the discovery → fetch → parse pipeline.
//!
//! Every test stands up a local `wiremock` server serving a root listing
//! page and its category pages, so no real network traffic is made.

use std::time::Duration;

use chrono::{Local, NaiveDate, SubsecRound};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prospekt_core::{
    CategoryEndpoint, CategoryExtractor, Catalog, ClientConfig, ProspektError, ProspektScraper,
    Session,
};

fn root_page(hrefs: &[&str]) -> String {
    let items: String = hrefs
        .iter()
        .map(|href| format!(r#"<li><a href="{href}">{href}</a></li>"#))
        .collect();
    format!(
        r#"<html><body>
             <main><h1>Hypermärkte</h1></main>
             <aside id="sidebar">
               <ul class="list-unstyled categories">{items}</ul>
             </aside>
           </body></html>"#
    )
}

const REWE_PAGE: &str = r#"
    <html><body>
      <div class="row">
        <div class="brochure-thumb col-xs-6 col-sm-3">
          <a href="/rewe/aktuelle-angebote/"><picture><img src="thumb.jpg" alt="REWE Prospekt"></picture></a>
          <div class="letak-description">
            <p class="grid-item-content"><strong>Aktuelle Angebote</strong></p>
            <p class="grid-item-content"><small class="hidden-sm">01.03.2024 - 15.03.2024</small></p>
          </div>
        </div>
      </div>
    </body></html>
"#;

const FLYER_WITH_LOGO_PAGE: &str = r#"
    <html><body>
      <div class="brochure-thumb">
        <picture><img src="flyer.jpg"></picture>
        <picture><img src="logo.png" alt="Logo REWE"></picture>
        <strong>Aktuelle Angebote</strong>
        <small class="hidden-sm">01.03.2024 - 15.03.2024</small>
      </div>
    </body></html>
"#;

const NO_VALIDITY_PAGE: &str = r#"
    <html><body>
      <div class="brochure-thumb">
        <picture><img data-src="lazy.jpg"></picture>
        <strong>Sonderaktion</strong>
      </div>
    </body></html>
"#;

async fn mount_page(server: &MockServer, page_path: &str, html: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(html.into()))
        .mount(server)
        .await;
}

fn root_url(server: &MockServer) -> String {
    format!("{}/hypermarkte/", server.uri())
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn discovery_resolves_category_links_against_root() {
    let server = MockServer::start().await;
    mount_page(&server, "/hypermarkte/", root_page(&["/rewe/"])).await;

    let session = Session::new().unwrap();
    let catalog = Catalog::discover_async(&root_url(&server), &session)
        .await
        .unwrap();

    let endpoints: Vec<CategoryEndpoint> = catalog.endpoints().cloned().collect();
    assert_eq!(
        endpoints,
        vec![CategoryEndpoint::new(format!("{}/rewe/", server.uri()), "rewe")]
    );
}

#[tokio::test]
async fn discovery_failure_aborts_before_any_category_fetch() {
    let server = MockServer::start().await;
    mount_page(&server, "/hypermarkte/", "<html><body><p>Wartung</p></body></html>").await;
    Mock::given(method("GET"))
        .and(path("/rewe/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REWE_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let result = ProspektScraper::new().collect(&root_url(&server)).await;

    assert!(
        matches!(result, Err(ProspektError::Discovery(_))),
        "expected Discovery error, got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Async mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn category_tile_becomes_record() {
    let server = MockServer::start().await;
    mount_page(&server, "/rewe/", REWE_PAGE).await;

    let session = Session::new().unwrap();
    let mut extractor =
        CategoryExtractor::new(CategoryEndpoint::new(format!("{}/rewe/", server.uri()), "rewe"));
    extractor.fetch_async(&session).await.unwrap();

    let records: Vec<_> = extractor.records().collect();
    assert_eq!(records.len(), 1);

    let json = records[0].to_json();
    let parsed_time = extractor
        .fetched_at()
        .unwrap()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    assert_eq!(
        json,
        serde_json::json!({
            "title": "Aktuelle Angebote",
            "thumbnail": "thumb.jpg",
            "shop_name": "rewe",
            "valid_from": "2024-03-01",
            "valid_to": "2024-03-15",
            "parsed_time": parsed_time,
        })
    );
}

#[tokio::test]
async fn fetch_async_twice_hits_server_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rewe/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REWE_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new().unwrap();
    let mut extractor =
        CategoryExtractor::new(CategoryEndpoint::new(format!("{}/rewe/", server.uri()), "rewe"));

    extractor.fetch_async(&session).await.unwrap();
    let fetched_at = extractor.fetched_at();
    extractor.fetch_async(&session).await.unwrap();

    assert_eq!(extractor.fetched_at(), fetched_at);
    assert_eq!(extractor.records().count(), 1);
    assert_eq!(extractor.records().count(), 1);
}

#[tokio::test]
async fn collect_walks_categories_in_discovery_order() {
    let server = MockServer::start().await;
    mount_page(&server, "/hypermarkte/", root_page(&["/rewe/", "/globus/"])).await;
    mount_page(&server, "/rewe/", REWE_PAGE).await;
    mount_page(&server, "/globus/", NO_VALIDITY_PAGE).await;

    let before = Local::now().naive_local().trunc_subsecs(0);
    let prospects = ProspektScraper::new()
        .collect(&root_url(&server))
        .await
        .unwrap();
    let after = Local::now().naive_local();

    assert_eq!(prospects.len(), 2);
    assert_eq!(prospects[0].shop_name, "rewe");
    assert_eq!(prospects[0].title, "Aktuelle Angebote");
    assert_eq!(prospects[1].shop_name, "globus");
    assert_eq!(prospects[1].title, "Sonderaktion");
    assert_eq!(prospects[1].thumbnail_url, "lazy.jpg");
    assert!(prospects
        .iter()
        .all(|p| p.parsed_at >= before && p.parsed_at <= after));
}

#[tokio::test]
async fn tile_without_validity_block_gets_epoch_dates() {
    let server = MockServer::start().await;
    mount_page(&server, "/hypermarkte/", root_page(&["/globus/"])).await;
    mount_page(&server, "/globus/", NO_VALIDITY_PAGE).await;

    let prospects = ProspektScraper::new()
        .collect(&root_url(&server))
        .await
        .unwrap();

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    assert_eq!(prospects[0].valid_from, epoch);
    assert_eq!(prospects[0].valid_to, epoch);
    assert_eq!(prospects[0].to_json()["valid_from"], "1970-01-01");
    assert_eq!(prospects[0].to_json()["valid_to"], "1970-01-01");
}

#[tokio::test]
async fn category_tile_with_shop_logo_keeps_flyer_thumbnail() {
    let server = MockServer::start().await;
    mount_page(&server, "/hypermarkte/", root_page(&["/rewe/"])).await;
    mount_page(&server, "/rewe/", FLYER_WITH_LOGO_PAGE).await;

    let prospects = ProspektScraper::new()
        .collect(&root_url(&server))
        .await
        .unwrap();

    assert_eq!(prospects.len(), 1);
    assert_eq!(prospects[0].thumbnail_url, "flyer.jpg");
    assert_eq!(prospects[0].shop_name, "rewe");
    assert_eq!(prospects[0].title, "Aktuelle Angebote");
}

#[tokio::test(flavor = "multi_thread")]
async fn collect_runs_on_spawned_task() {
    let server = MockServer::start().await;
    mount_page(&server, "/hypermarkte/", root_page(&["/rewe/", "/globus/"])).await;
    mount_page(&server, "/rewe/", REWE_PAGE).await;
    mount_page(&server, "/globus/", NO_VALIDITY_PAGE).await;

    let root = root_url(&server);
    let prospects = tokio::spawn(async move { ProspektScraper::new().collect(&root).await })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(prospects.len(), 2);
    assert_eq!(prospects[0].shop_name, "rewe");
    assert_eq!(prospects[1].shop_name, "globus");
}

#[tokio::test]
async fn duplicate_sidebar_links_are_fetched_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/hypermarkte/", root_page(&["/rewe/", "/globus/", "/rewe/"])).await;
    Mock::given(method("GET"))
        .and(path("/rewe/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REWE_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/globus/", NO_VALIDITY_PAGE).await;

    let prospects = ProspektScraper::new()
        .collect(&root_url(&server))
        .await
        .unwrap();

    let shops: Vec<&str> = prospects.iter().map(|p| p.shop_name.as_str()).collect();
    assert_eq!(shops, vec!["rewe", "globus"]);
}

#[tokio::test]
async fn missing_category_page_aborts_collection() {
    let server = MockServer::start().await;
    mount_page(&server, "/hypermarkte/", root_page(&["/rewe/", "/globus/"])).await;
    Mock::given(method("GET"))
        .and(path("/rewe/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/globus/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NO_VALIDITY_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let result = ProspektScraper::new().collect(&root_url(&server)).await;

    match result {
        Err(ProspektError::NotFound(url)) => assert!(url.ends_with("/rewe/")),
        other => panic!("expected NotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hypermarkte/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let result = ProspektScraper::new().collect(&root_url(&server)).await;

    assert!(
        matches!(result, Err(ProspektError::UnexpectedStatus { status: 503, .. })),
        "expected UnexpectedStatus 503, got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Blocking mode
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn blocking_mode_matches_async_mode() {
    let server = MockServer::start().await;
    mount_page(&server, "/hypermarkte/", root_page(&["/rewe/", "/globus/"])).await;
    mount_page(&server, "/rewe/", REWE_PAGE).await;
    mount_page(&server, "/globus/", NO_VALIDITY_PAGE).await;

    let root = root_url(&server);
    let blocking = tokio::task::spawn_blocking(move || ProspektScraper::new().collect_blocking(&root))
        .await
        .unwrap()
        .unwrap();
    let suspending = ProspektScraper::new()
        .collect(&root_url(&server))
        .await
        .unwrap();

    let strip = |prospects: &[prospekt_core::Prospect]| -> Vec<(String, String, String)> {
        prospects
            .iter()
            .map(|p| (p.title.clone(), p.thumbnail_url.clone(), p.shop_name.clone()))
            .collect()
    };
    assert_eq!(strip(&blocking), strip(&suspending));
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_mode_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hypermarkte/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(root_page(&["/rewe/"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let root = root_url(&server);
    let result = tokio::task::spawn_blocking(move || {
        let config = ClientConfig {
            timeout_secs: 1,
            ..ClientConfig::default()
        };
        ProspektScraper::with_config(config).collect_blocking(&root)
    })
    .await
    .unwrap();

    match result {
        Err(ProspektError::HttpError(err)) => assert!(err.is_timeout()),
        other => panic!("expected timeout, got: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_fetch_twice_hits_server_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rewe/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REWE_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/rewe/", server.uri());
    let count = tokio::task::spawn_blocking(move || {
        let client = prospekt_core::BlockingClient::new().unwrap();
        let mut extractor = CategoryExtractor::new(CategoryEndpoint::new(url, "rewe"));
        extractor.fetch(&client).unwrap();
        extractor.fetch(&client).unwrap().records().count()
    })
    .await
    .unwrap();

    assert_eq!(count, 1);
}
