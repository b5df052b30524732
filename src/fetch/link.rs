use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use super::retry::with_retry;
use crate::{config::RetryPolicy, error::SyncError};

static LINKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("link selector should parse"));

async fn get_text(client: &Client, url: &Url) -> reqwest::Result<String> {
    debug!("Fetching text from {}", url);
    client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

/// Fetch the timetable page and resolve the absolute URL of the current
/// spreadsheet.
///
/// The anchor must be a direct child of a `div` whose id starts with
/// `id_prefix`; its href is joined onto `download_host`.
#[instrument(level = "info", skip(client, policy), fields(page = %page_url))]
pub async fn resolve_download_url(
    client: &Client,
    page_url: &Url,
    id_prefix: &str,
    download_host: &Url,
    policy: RetryPolicy,
) -> Result<Url, SyncError> {
    let html = with_retry(policy, page_url.as_str(), || get_text(client, page_url))
        .await
        .map_err(|e| SyncError::SourceUnavailable {
            url: page_url.to_string(),
            reason: e.to_string(),
        })?;

    let not_found = || SyncError::LinkNotFound {
        prefix: id_prefix.to_string(),
    };
    let href = find_download_href(&html, id_prefix).ok_or_else(not_found)?;
    let url = download_host.join(&href).map_err(|_| not_found())?;

    info!(url = %url, "resolved timetable download link");
    Ok(url)
}

/// First non-empty `href`, in document order, of an `<a>` whose parent is a
/// `div` with an id starting with `id_prefix`.
pub fn find_download_href(html: &str, id_prefix: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let href = doc
        .select(&LINKS)
        .filter(|a| {
            a.parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|parent| {
                    parent.value().name() == "div"
                        && parent.value().id().is_some_and(|id| id.starts_with(id_prefix))
                })
        })
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .map(str::to_string);
    href
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use warp::{http::StatusCode, Filter};

    const PAGE: &str = r#"<html><body>
        <div id="header"><a href="/home">Home</a></div>
        <div id="dlBtn-8812"><span><a href="/nested">Nested</a></span></div>
        <div id="dlBtn-9913"><a href="/u/0/timetable.xlsx?attredirects=0">Download</a></div>
        <div id="dlBtn-0001"><a href="/older.xlsx">Older</a></div>
    </body></html>"#;

    fn no_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 0,
            initial_backoff: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_first_direct_child_anchor_wins() {
        assert_eq!(
            find_download_href(PAGE, "dlBtn").as_deref(),
            Some("/u/0/timetable.xlsx?attredirects=0")
        );
    }

    #[test]
    fn test_nested_containers_follow_document_order() {
        let page = r#"<div id="dlBtn-outer">
            <div id="dlBtn-inner"><a href="/first.xlsx">First</a></div>
            <a href="/second.xlsx">Second</a>
        </div>"#;
        assert_eq!(find_download_href(page, "dlBtn").as_deref(), Some("/first.xlsx"));
    }

    #[test]
    fn test_empty_href_falls_through_to_next_container() {
        let page = r#"<div id="dlBtn-1"><a href="  ">Pending</a></div>
            <div id="dlBtn-2"><a href="/real.xlsx">Download</a></div>"#;
        assert_eq!(find_download_href(page, "dlBtn").as_deref(), Some("/real.xlsx"));
    }

    #[test]
    fn test_no_matching_container() {
        assert_eq!(find_download_href(PAGE, "missing"), None);
        assert_eq!(find_download_href("<html></html>", "dlBtn"), None);
    }

    #[tokio::test]
    async fn test_resolves_against_download_host() {
        let route = warp::path("timetable").map(|| warp::reply::html(PAGE));
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let page = Url::parse(&format!("http://{addr}/timetable")).unwrap();
        let host = Url::parse("https://sites.google.com").unwrap();
        let url = resolve_download_url(&Client::new(), &page, "dlBtn", &host, no_retry())
            .await
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://sites.google.com/u/0/timetable.xlsx?attredirects=0"
        );
    }

    #[tokio::test]
    async fn test_server_error_is_source_unavailable() {
        let route = warp::path("timetable")
            .map(|| warp::reply::with_status("boom", StatusCode::INTERNAL_SERVER_ERROR));
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let page = Url::parse(&format!("http://{addr}/timetable")).unwrap();
        let host = Url::parse("https://sites.google.com").unwrap();
        let err = resolve_download_url(&Client::new(), &page, "dlBtn", &host, no_retry())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::SourceUnavailable { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_missing_anchor_is_link_not_found() {
        let route = warp::path("timetable").map(|| warp::reply::html("<div id=\"other\"></div>"));
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let page = Url::parse(&format!("http://{addr}/timetable")).unwrap();
        let host = Url::parse("https://sites.google.com").unwrap();
        let err = resolve_download_url(&Client::new(), &page, "dlBtn", &host, no_retry())
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::LinkNotFound { ref prefix } if prefix == "dlBtn"));
    }
}
