//! Single-page fetcher.
//!
//! Fetches one URL, refuses anything that is not HTML, and never follows
//! a redirect onto a private or loopback address unless configured to.

use std::net::IpAddr;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::{Host, Url};

use linksorter_shared::{FetchConfig, LinkSorterError, Result};

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("linksorter/", env!("CARGO_PKG_VERSION"));

/// Content types accepted as HTML.
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

// ---------------------------------------------------------------------------
// FetchedPage
// ---------------------------------------------------------------------------

/// A fetched page before text extraction.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: String,
    /// HTTP status code.
    pub status_code: u16,
    /// `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
    /// Response body decoded as text.
    pub html: String,
}

// ---------------------------------------------------------------------------
// PageFetcher
// ---------------------------------------------------------------------------

/// HTTP page fetcher. Cheap to clone; the inner client is reference-counted.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    allow_private_hosts: bool,
}

impl PageFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let max_redirects = config.max_redirects;
        let allow_private_hosts = config.allow_private_hosts;

        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let hops = attempt.previous().len();
            match redirect_refusal(hops, attempt.url(), max_redirects, allow_private_hosts) {
                Some(reason) => attempt.error(reason),
                None => attempt.follow(),
            }
        });

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(policy)
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LinkSorterError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            allow_private_hosts,
        })
    }

    /// Fetch `url` and return its HTML body.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        if !self.allow_private_hosts && is_ssrf_target(url) {
            return Err(LinkSorterError::Fetch(format!(
                "{url}: refusing to fetch a private or non-HTTP address"
            )));
        }

        debug!("fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| LinkSorterError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkSorterError::Fetch(format!("{url}: HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(ct) = content_type.as_deref() {
            if !is_html_content_type(ct) {
                return Err(LinkSorterError::Fetch(format!(
                    "{url}: unsupported content type '{ct}'"
                )));
            }
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| LinkSorterError::Fetch(format!("{url}: body read failed: {e}")))?;

        debug!(status = status.as_u16(), body_len = html.len(), "page fetched");

        Ok(FetchedPage {
            url: final_url,
            status_code: status.as_u16(),
            content_type,
            html,
        })
    }
}

/// Why a redirect must not be followed, if it must not.
///
/// `hops` counts the URLs already requested, so the first redirect has
/// `hops == 1`. Up to `max_redirects` redirects are followed.
fn redirect_refusal(
    hops: usize,
    target: &Url,
    max_redirects: usize,
    allow_private_hosts: bool,
) -> Option<&'static str> {
    if hops > max_redirects {
        Some("redirect limit exceeded")
    } else if !allow_private_hosts && is_ssrf_target(target) {
        Some("redirect to a private address blocked")
    } else {
        None
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    HTML_CONTENT_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(mime))
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Check if a URL targets a potentially dangerous resource.
pub fn is_ssrf_target(url: &Url) -> bool {
    // Block non-HTTP schemes
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    match url.host() {
        Some(Host::Ipv4(v4)) => is_private_ip(&IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => match v6.to_ipv4_mapped() {
            // ::ffff:a.b.c.d reaches the IPv4 host
            Some(v4) => is_private_ip(&IpAddr::V4(v4)),
            None => is_private_ip(&IpAddr::V6(v6)),
        },
        // Block known local hostnames, with or without the root dot
        Some(Host::Domain(host)) => {
            let host = host.strip_suffix('.').unwrap_or(host);
            host == "localhost" || host.ends_with(".local") || host.ends_with(".internal")
        }
        None => true,
    }
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
                // 192.0.0.0/24
                || (v4.octets()[0] == 192 && v4.octets()[1] == 0 && v4.octets()[2] == 0)
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 (unique local)
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                // fe80::/10 (link local)
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn local_fetcher() -> PageFetcher {
        let config = FetchConfig {
            allow_private_hosts: true,
            ..FetchConfig::default()
        };
        PageFetcher::new(&config).unwrap()
    }

    #[test]
    fn test_ssrf_protection_blocks_file() {
        let url = Url::parse("file:///etc/passwd").unwrap();
        assert!(is_ssrf_target(&url));
    }

    #[test]
    fn test_ssrf_protection_blocks_private_ip() {
        let url = Url::parse("http://192.168.1.1/admin").unwrap();
        assert!(is_ssrf_target(&url));

        let url = Url::parse("http://10.0.0.1/").unwrap();
        assert!(is_ssrf_target(&url));

        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert!(is_ssrf_target(&url));

        let url = Url::parse("http://[::1]:8080/").unwrap();
        assert!(is_ssrf_target(&url));

        let url = Url::parse("http://[::ffff:127.0.0.1]:8080/").unwrap();
        assert!(is_ssrf_target(&url));

        let url = Url::parse("http://[::ffff:10.0.0.1]/").unwrap();
        assert!(is_ssrf_target(&url));

        // A mapped public address is still public
        let url = Url::parse("http://[::ffff:8.8.8.8]/").unwrap();
        assert!(!is_ssrf_target(&url));
    }

    #[test]
    fn test_ssrf_protection_allows_public() {
        let url = Url::parse("https://www.zara.com/us/").unwrap();
        assert!(!is_ssrf_target(&url));
    }

    #[test]
    fn test_ssrf_blocks_localhost() {
        let url = Url::parse("http://localhost:3000/api").unwrap();
        assert!(is_ssrf_target(&url));

        let url = Url::parse("http://localhost.:8080/").unwrap();
        assert!(is_ssrf_target(&url));

        let url = Url::parse("http://printer.local./").unwrap();
        assert!(is_ssrf_target(&url));
    }

    #[test]
    fn test_redirect_refusal() {
        let public = Url::parse("https://www.zara.com/us/").unwrap();
        let private = Url::parse("http://10.0.0.1/").unwrap();

        assert_eq!(redirect_refusal(1, &public, 5, false), None);
        assert_eq!(redirect_refusal(5, &public, 5, false), None);
        assert_eq!(redirect_refusal(6, &public, 5, false), Some("redirect limit exceeded"));
        assert_eq!(
            redirect_refusal(1, &private, 5, false),
            Some("redirect to a private address blocked")
        );
        assert_eq!(redirect_refusal(1, &private, 5, true), None);
    }

    #[test]
    fn test_html_content_types() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("Application/XHTML+XML"));
        assert!(!is_html_content_type("application/pdf"));
        assert!(!is_html_content_type("text/plain"));
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        let page = "<html><body><h1>Careers</h1></body></html>";

        Mock::given(method("GET"))
            .and(path("/careers"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/careers", server.uri())).unwrap();
        let fetched = local_fetcher().fetch(&url).await.unwrap();

        assert_eq!(fetched.status_code, 200);
        assert_eq!(fetched.html, page);
        assert_eq!(fetched.content_type.as_deref(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_fetch_without_content_type() {
        let server = MockServer::start().await;

        Mock::given(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes("<p>hi</p>"))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let fetched = local_fetcher().fetch(&url).await.unwrap();
        assert_eq!(fetched.html, "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let server = MockServer::start().await;

        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let err = local_fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, LinkSorterError::Fetch(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let server = MockServer::start().await;

        Mock::given(path("/file.pdf"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/file.pdf", server.uri())).unwrap();
        let err = local_fetcher().fetch(&url).await.unwrap_err();
        assert!(err.to_string().contains("unsupported content type"));
    }

    async fn mount_redirect(server: &MockServer, from: &str, to: &str) {
        Mock::given(path(from))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", to))
            .mount(server)
            .await;
    }

    async fn mount_redirect_chain(server: &MockServer) {
        mount_redirect(server, "/r0", "/r1").await;
        mount_redirect(server, "/r1", "/r2").await;
        mount_redirect(server, "/r2", "/r3").await;
        Mock::given(path("/r3"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>end</p>", "text/html"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects_up_to_limit() {
        let server = MockServer::start().await;
        mount_redirect_chain(&server).await;

        let config = FetchConfig {
            allow_private_hosts: true,
            max_redirects: 3,
            ..FetchConfig::default()
        };
        let url = Url::parse(&format!("{}/r0", server.uri())).unwrap();
        let fetched = PageFetcher::new(&config).unwrap().fetch(&url).await.unwrap();

        assert_eq!(fetched.html, "<p>end</p>");
        assert!(fetched.url.ends_with("/r3"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_too_many_redirects() {
        let server = MockServer::start().await;
        mount_redirect_chain(&server).await;

        let config = FetchConfig {
            allow_private_hosts: true,
            max_redirects: 2,
            ..FetchConfig::default()
        };
        let url = Url::parse(&format!("{}/r0", server.uri())).unwrap();
        let err = PageFetcher::new(&config).unwrap().fetch(&url).await.unwrap_err();

        assert!(matches!(err, LinkSorterError::Fetch(_)));
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| r.url.path() != "/r3"));
    }

    #[tokio::test]
    async fn test_fetch_blocks_redirect_to_private_host() {
        let server = MockServer::start().await;
        mount_redirect(&server, "/start", "/secret").await;
        Mock::given(path("/secret"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>secret</p>", "text/html"))
            .mount(&server)
            .await;

        // The redirect policy is built with private hosts refused; only the
        // initial host check is relaxed so the first hop reaches the mock.
        let mut fetcher = PageFetcher::new(&FetchConfig::default()).unwrap();
        fetcher.allow_private_hosts = true;

        let url = Url::parse(&format!("{}/start", server.uri())).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, LinkSorterError::Fetch(_)));
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().any(|r| r.url.path() == "/start"));
        assert!(requests.iter().all(|r| r.url.path() != "/secret"));
    }

    #[tokio::test]
    async fn test_fetch_blocks_private_host_by_default() {
        let server = MockServer::start().await;
        let fetcher = PageFetcher::new(&FetchConfig::default()).unwrap();

        let url = Url::parse(&server.uri()).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(err.to_string().contains("private"));
        // The mock server must never have been contacted
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
