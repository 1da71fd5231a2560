//! End-to-end pipeline tests against a mock announcements server.

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dit_news_sync::config::{Category, SiteConfig};
use dit_news_sync::fetch::Fetcher;
use dit_news_sync::models::CategoryOutcome;
use dit_news_sync::pipeline;
use dit_news_sync::sinks::{JsonSink, SqliteSink};
use dit_news_sync::watermark::FileWatermark;

/// A results page the way the site serves it: header row with a colspan
/// marker, then one (title link, date) pair per article.
fn results_page(rows: &[(u64, &str, &str)]) -> String {
    let mut body = String::from("<html><body><table class=\"table table-striped\">");
    body.push_str("<tr><td colspan=\"2\">Αποτελεσματα</td></tr>");
    for (id, title, date) in rows {
        body.push_str(&format!(
            "<tr><td><a href=\"articles.php?id={id}\">{title}</a></td><td>({date})</td></tr>"
        ));
    }
    body.push_str("</table></body></html>");
    body
}

fn test_config(server_uri: &str, categories: &[&str]) -> SiteConfig {
    SiteConfig {
        base_url: format!("{server_uri}/"),
        articles_url: format!("{server_uri}/getarticles.php"),
        referer: format!("{server_uri}/articles.php"),
        user_agent: "dit_news_sync integration test".into(),
        categories: categories.iter().map(|c| Category::new(c, c)).collect(),
    }
}

#[tokio::test]
async fn accepts_only_articles_past_the_watermark() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getarticles.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[
            (105, "Newest", "1/6/2025"),
            (103, "Newer", "28/5/2025"),
            (100, "At the watermark", "20/5/2025"),
            (98, "Old", "12/5/2025"),
        ])))
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), &["Lessons"]);
    let fetcher = Fetcher::new(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonSink::new(dir.path().join("news_data.json"));

    let report = pipeline::run(&config, &fetcher, &mut sink, 100).await.unwrap();

    assert_eq!(report.accepted, 2);
    assert_eq!(report.committed, 2);
    assert_eq!(report.watermark_before, 100);
    assert_eq!(report.watermark_after, 105);
    assert_eq!(report.skipped(), 0);

    let stored = sink.load().await;
    let ids: Vec<u64> = stored.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![105, 103]);
    // relative hrefs came back absolute, category label attached
    assert_eq!(
        stored[0].link,
        format!("{}/articles.php?id=105", server.uri())
    );
    assert_eq!(stored[0].category, "Lessons");
    assert_eq!(stored[0].date, "1/6/2025");
}

#[tokio::test]
async fn requests_carry_browser_identity_and_form_encoding() {
    let server = MockServer::start().await;
    // only a request with the configured identity gets the page
    Mock::given(method("POST"))
        .and(path("/getarticles.php"))
        .and(header("user-agent", "dit_news_sync integration test"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("category=Lessons"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(results_page(&[(1, "Only", "1/1")])),
        )
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), &["Lessons"]);
    let fetcher = Fetcher::new(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonSink::new(dir.path().join("news_data.json"));

    let report = pipeline::run(&config, &fetcher, &mut sink, 0).await.unwrap();
    assert_eq!(report.skipped(), 0);
    assert_eq!(report.accepted, 1);
}

#[tokio::test]
async fn second_run_against_unchanged_upstream_accepts_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getarticles.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[
            (42, "One", "1/1"),
            (41, "Two", "2/1"),
        ])))
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), &["Lessons"]);
    let fetcher = Fetcher::new(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonSink::new(dir.path().join("news_data.json"));
    let watermark = FileWatermark::new(dir.path().join("latest_id.txt"));

    let before = watermark.read().await;
    let first = pipeline::run(&config, &fetcher, &mut sink, before).await.unwrap();
    watermark.write(first.watermark_after).await.unwrap();
    assert_eq!(first.accepted, 2);
    assert_eq!(first.watermark_after, 42);

    let before = watermark.read().await;
    let second = pipeline::run(&config, &fetcher, &mut sink, before).await.unwrap();
    watermark.write(second.watermark_after).await.unwrap();

    assert_eq!(second.accepted, 0);
    assert_eq!(second.committed, 0);
    assert_eq!(second.watermark_after, 42);
    assert_eq!(watermark.read().await, 42);
    assert_eq!(sink.load().await.len(), 2);
}

#[tokio::test]
async fn failing_category_does_not_block_the_others() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getarticles.php"))
        .and(body_string_contains("Broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/getarticles.php"))
        .and(body_string_contains("Healthy"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(results_page(&[(7, "Still here", "1/1")])),
        )
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), &["Broken", "Healthy"]);
    let fetcher = Fetcher::new(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonSink::new(dir.path().join("news_data.json"));

    let report = pipeline::run(&config, &fetcher, &mut sink, 0).await.unwrap();

    assert_eq!(report.skipped(), 1);
    assert!(matches!(
        &report.outcomes[0],
        CategoryOutcome::Skipped { category, .. } if category == "Broken"
    ));
    assert_eq!(report.accepted, 1);
    assert_eq!(report.watermark_after, 7);

    let stored = sink.load().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].category, "Healthy");
}

#[tokio::test]
async fn missing_results_table_is_an_empty_category_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getarticles.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Καμια ανακοινωση</p></body></html>"),
        )
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), &["Quiet"]);
    let fetcher = Fetcher::new(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonSink::new(dir.path().join("news_data.json"));

    let report = pipeline::run(&config, &fetcher, &mut sink, 0).await.unwrap();

    assert_eq!(report.skipped(), 0);
    assert!(matches!(
        &report.outcomes[0],
        CategoryOutcome::Fetched { rows: 0, accepted: 0, .. }
    ));
    assert_eq!(report.watermark_after, 0);
}

#[tokio::test]
async fn sqlite_deployment_derives_its_watermark_from_the_table() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getarticles.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[
            (12, "A", "1/1"),
            (11, "B", "2/1"),
        ])))
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), &["Lessons"]);
    let fetcher = Fetcher::new(&config).unwrap();
    let mut sink = SqliteSink::open_in_memory().unwrap();

    let before = sink.max_id().unwrap();
    let first = pipeline::run(&config, &fetcher, &mut sink, before).await.unwrap();
    assert_eq!(first.accepted, 2);
    assert_eq!(first.committed, 2);
    assert_eq!(sink.max_id().unwrap(), 12);

    // next run reads the derived watermark and finds nothing new
    let before = sink.max_id().unwrap();
    let second = pipeline::run(&config, &fetcher, &mut sink, before).await.unwrap();
    assert_eq!(second.accepted, 0);
    assert_eq!(second.committed, 0);
    assert_eq!(sink.count().unwrap(), 2);
}

#[tokio::test]
async fn rows_without_ids_are_rejected_but_do_not_stop_the_rest() {
    let server = MockServer::start().await;
    let page = "<html><body><table class=\"table table-striped\">\
        <tr><td><a href=\"articles.php\">No id here</a></td><td>(1/1)</td></tr>\
        <tr><td><a href=\"articles.php?id=55\">Valid</a></td><td>(2/1)</td></tr>\
        </table></body></html>";
    Mock::given(method("POST"))
        .and(path("/getarticles.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), &["Lessons"]);
    let fetcher = Fetcher::new(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonSink::new(dir.path().join("news_data.json"));

    let report = pipeline::run(&config, &fetcher, &mut sink, 0).await.unwrap();

    // both rows extracted, only the one with an id survives normalization
    assert!(matches!(
        &report.outcomes[0],
        CategoryOutcome::Fetched { rows: 2, accepted: 1, .. }
    ));
    assert_eq!(sink.load().await[0].id, 55);
}
