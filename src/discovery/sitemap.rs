//! Discovery through the platform's daily sitemaps.
//!
//! # URL Pattern
//!
//! One sitemap per calendar day:
//! `{base}/posts/{yyyy}/posts-{yyyy-mm-dd}.xml`

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::fetch::Fetcher;

/// Sitemap URL for a single day.
pub fn sitemap_url(base: &str, day: NaiveDate) -> String {
    format!(
        "{}/posts/{}/posts-{}.xml",
        base.trim_end_matches('/'),
        day.format("%Y"),
        day.format("%Y-%m-%d")
    )
}

/// One sitemap URL per day in `[start, end)`, oldest first.
pub fn sitemap_urls(base: &str, start: NaiveDate, end: NaiveDate) -> Vec<String> {
    start
        .iter_days()
        .take_while(|day| *day < end)
        .map(|day| sitemap_url(base, day))
        .collect()
}

/// Collect post URLs from every daily sitemap in `[start, end)`.
///
/// # Arguments
///
/// * `fetcher` - Shared HTTP fetcher
/// * `base` - Sitemap prefix, e.g. `https://medium.com/sitemap`
/// * `start` - First day to fetch
/// * `end` - Exclusive upper bound, normally today
///
/// # Returns
///
/// Post URLs in sitemap order; duplicates are kept. A day whose sitemap
/// cannot be fetched or parsed is logged and contributes nothing, so this
/// never fails as a whole.
#[instrument(level = "info", skip(fetcher))]
pub async fn discover(
    fetcher: &Fetcher,
    base: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<String> {
    let sitemaps = sitemap_urls(base, start, end);
    info!(days = sitemaps.len(), "Fetching daily sitemaps");

    let mut links = Vec::new();
    for sitemap in &sitemaps {
        match fetcher.fetch_sitemap(sitemap).await {
            Ok(locs) => {
                debug!(%sitemap, count = locs.len(), "Read sitemap");
                links.extend(locs);
            }
            Err(e) => warn!(%sitemap, error = %e, "Skipping sitemap"),
        }
    }

    info!(count = links.len(), "Discovered post URLs from sitemaps");
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn urlset(locs: &[&str]) -> String {
        let body: String = locs
            .iter()
            .map(|l| format!("<url><loc>{l}</loc></url>"))
            .collect();
        format!(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{body}</urlset>"#)
    }

    #[test]
    fn test_sitemap_url_format() {
        assert_eq!(
            sitemap_url("https://medium.com/sitemap/", day(2018, 7, 6)),
            "https://medium.com/sitemap/posts/2018/posts-2018-07-06.xml"
        );
    }

    #[test]
    fn test_one_url_per_day_half_open() {
        let start = day(2018, 12, 30);
        let end = day(2019, 1, 3);
        let urls = sitemap_urls("https://m.test/sitemap", start, end);
        assert_eq!(urls.len() as i64, (end - start).num_days());
        assert_eq!(urls[0], "https://m.test/sitemap/posts/2018/posts-2018-12-30.xml");
        assert_eq!(urls[3], "https://m.test/sitemap/posts/2019/posts-2019-01-02.xml");

        let mut unique = urls.clone();
        unique.dedup();
        assert_eq!(unique.len(), urls.len());
    }

    #[test]
    fn test_empty_range() {
        let d = day(2020, 2, 29);
        assert!(sitemap_urls("b", d, d).is_empty());
        assert!(sitemap_urls("b", d, day(2020, 2, 1)).is_empty());
    }

    #[tokio::test]
    async fn test_failed_day_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap/posts/2018/posts-2018-07-06.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&[
                "https://m.test/p/a",
                "https://m.test/p/b",
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sitemap/posts/2018/posts-2018-07-07.xml"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sitemap/posts/2018/posts-2018-07-08.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(urlset(&["https://m.test/p/b", "https://m.test/p/c"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let base = format!("{}/sitemap", server.uri());
        let links = discover(&fetcher, &base, day(2018, 7, 6), day(2018, 7, 9)).await;

        assert_eq!(
            links,
            vec![
                "https://m.test/p/a",
                "https://m.test/p/b",
                "https://m.test/p/b",
                "https://m.test/p/c",
            ]
        );
    }

    #[tokio::test]
    async fn test_all_days_failing_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(5)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new().unwrap();
        let base = format!("{}/sitemap", server.uri());
        let links = discover(&fetcher, &base, day(2021, 3, 1), day(2021, 3, 6)).await;
        assert!(links.is_empty());
    }
}
