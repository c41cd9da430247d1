use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use scraper::{Html, Selector};
use tracing::debug;

use crate::config::CrawlConfig;

#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Final URL after redirects.
    pub url: String,
    pub html: String,
}

/// Produces the HTML of a page. Implementations that drive a real browser
/// plug in here; the crawl never talks to the network directly.
pub trait Renderer {
    fn render(&mut self, url: &str) -> Result<RenderedPage>;

    /// Values of `attribute` on every element matching `selector`, in
    /// document order.
    fn attribute_values(
        &self,
        page: &RenderedPage,
        selector: &str,
        attribute: &str,
    ) -> Result<Vec<String>> {
        let selector = Selector::parse(selector)
            .map_err(|err| anyhow!("failed to compile selector `{selector}`: {err}"))?;
        let document = Html::parse_document(&page.html);
        Ok(document
            .select(&selector)
            .filter_map(|element| element.value().attr(attribute))
            .map(str::to_string)
            .collect())
    }
}

/// Plain HTTP renderer: fetches server-rendered HTML without running scripts.
pub struct HttpRenderer {
    client: Client,
    settle_delay: Duration,
}

impl HttpRenderer {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.page_timeout)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            settle_delay: config.settle_delay,
        })
    }
}

impl Renderer for HttpRenderer {
    fn render(&mut self, url: &str) -> Result<RenderedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("failed to fetch page: {url}"))?
            .error_for_status()
            .with_context(|| format!("page returned an error status: {url}"))?;

        let final_url = response.url().to_string();
        let html = response
            .text()
            .with_context(|| format!("failed to read page body: {url}"))?;

        debug!(url = %url, final_url = %final_url, bytes = html.len(), "rendered page");
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }

        Ok(RenderedPage {
            url: final_url,
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoNetwork;

    impl Renderer for NoNetwork {
        fn render(&mut self, url: &str) -> Result<RenderedPage> {
            Err(anyhow!("offline: {url}"))
        }
    }

    #[test]
    fn attribute_values_follow_document_order() {
        let page = RenderedPage {
            url: "https://dokkaninfo.com/cards".to_string(),
            html: r#"<div class="row d-flex flex-wrap justify-content-center">
                <a class="col-auto" href="/cards/2">b</a>
                <a class="col-auto" href="/cards/1">a</a>
                <a class="other" href="/cards/3">c</a></div>"#
                .to_string(),
        };

        let hrefs = NoNetwork
            .attribute_values(
                &page,
                r#"div.row.d-flex.flex-wrap.justify-content-center a.col-auto[href^="/cards/"]"#,
                "href",
            )
            .expect("values");

        assert_eq!(hrefs, vec!["/cards/2", "/cards/1"]);
    }

    #[test]
    fn invalid_selector_is_an_error() {
        let page = RenderedPage {
            url: String::new(),
            html: String::new(),
        };
        assert!(NoNetwork.attribute_values(&page, "div[", "href").is_err());
    }
}
