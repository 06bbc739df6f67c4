mod helpers;

use helpers::{fast_retry, mount_xml, sitemap_index, urlset};
use sitemark::sitemap::{SitemapError, load_sitemap};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn locs(entries: &[sitemark::sitemap::SitemapEntry]) -> Vec<String> {
    entries.iter().map(|e| e.loc.to_string()).collect()
}

#[tokio::test]
async fn loads_a_plain_urlset() {
    let server = MockServer::start().await;
    let pages = vec![
        "https://example.com/".to_string(),
        "https://example.com/about".to_string(),
    ];
    mount_xml(&server, "/sitemap.xml", urlset(&pages)).await;

    let entries = load_sitemap(&format!("{}/sitemap.xml", server.uri()), 2, fast_retry())
        .await
        .unwrap();
    assert_eq!(locs(&entries), pages);
}

#[tokio::test]
async fn follows_sitemap_indexes_in_order_and_dedupes() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(
        &server,
        "/sitemap_index.xml",
        sitemap_index(&[
            format!("{base}/posts.xml"),
            format!("{base}/pages.xml"),
        ]),
    )
    .await;
    mount_xml(
        &server,
        "/posts.xml",
        urlset(&[
            "https://example.com/post-1".into(),
            "https://example.com/shared".into(),
        ]),
    )
    .await;
    mount_xml(
        &server,
        "/pages.xml",
        urlset(&[
            "https://example.com/shared".into(),
            "https://example.com/contact".into(),
        ]),
    )
    .await;

    let entries = load_sitemap(&format!("{base}/sitemap_index.xml"), 2, fast_retry())
        .await
        .unwrap();
    assert_eq!(
        locs(&entries),
        vec![
            "https://example.com/post-1",
            "https://example.com/shared",
            "https://example.com/contact",
        ]
    );
}

#[tokio::test]
async fn stops_at_depth_limit() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(&server, "/root.xml", sitemap_index(&[format!("{base}/nested.xml")])).await;
    mount_xml(&server, "/nested.xml", urlset(&["https://example.com/deep".into()])).await;

    let entries = load_sitemap(&format!("{base}/root.xml"), 0, fast_retry()).await.unwrap();
    assert!(entries.is_empty());

    let entries = load_sitemap(&format!("{base}/root.xml"), 1, fast_retry()).await.unwrap();
    assert_eq!(locs(&entries), vec!["https://example.com/deep"]);
}

#[tokio::test]
async fn broken_nested_sitemap_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(
        &server,
        "/index.xml",
        sitemap_index(&[format!("{base}/missing.xml"), format!("{base}/ok.xml")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_xml(&server, "/ok.xml", urlset(&["https://example.com/ok".into()])).await;

    let entries = load_sitemap(&format!("{base}/index.xml"), 2, fast_retry()).await.unwrap();
    assert_eq!(locs(&entries), vec!["https://example.com/ok"]);
}

#[tokio::test]
async fn root_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = load_sitemap(&format!("{}/sitemap.xml", server.uri()), 2, fast_retry())
        .await
        .unwrap_err();
    assert!(matches!(err, SitemapError::Fetch(_)));
}

#[tokio::test]
async fn html_page_is_not_a_sitemap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Page not found</body></html>")
                .insert_header("Content-Type", "text/html"),
        )
        .mount(&server)
        .await;

    let err = load_sitemap(&format!("{}/sitemap.xml", server.uri()), 2, fast_retry())
        .await
        .unwrap_err();
    assert!(matches!(err, SitemapError::UnknownFormat));
}

#[tokio::test]
async fn transient_root_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_xml(&server, "/sitemap.xml", urlset(&["https://example.com/after-retry".into()])).await;

    let entries = load_sitemap(&format!("{}/sitemap.xml", server.uri()), 2, fast_retry())
        .await
        .unwrap();
    assert_eq!(locs(&entries), vec!["https://example.com/after-retry"]);
}

#[tokio::test]
async fn missing_sitemap_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = load_sitemap(&format!("{}/sitemap.xml", server.uri()), 2, fast_retry()).await;
    assert!(matches!(result, Err(SitemapError::Fetch(_))));
}
