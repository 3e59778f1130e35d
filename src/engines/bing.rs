//! Bing dictionary engine
//!
//! Scrapes the hover-translation snippet that cn.bing.com serves for
//! dictionary look-ups. Works for words and short phrases only; the
//! language direction is decided by the service itself.

use scraper::{ElementRef, Html, Selector};

use crate::core::client::{url_encode, HttpClient, HttpRequest, HttpResponse};
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{TranslationRequest, TranslationResult};
use crate::engines::{base_url, TranslationEngine, BROWSER_AGENT};

const BING_HOST: &str = "cn.bing.com";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| TranslationError::parse(format!("invalid selector {:?}: {:?}", css, e)))
}

/// Decoded text of an element with whitespace runs collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract phonetics and `pos meaning` lines from the snippet
pub fn parse_hover(html: &str) -> Result<Vec<String>> {
    let fragment = Html::parse_fragment(html);
    let mut lines = Vec::new();

    let phonetics: Vec<String> = fragment
        .select(&selector("span.ht_attr")?)
        .map(element_text)
        .filter(|ph| !ph.is_empty())
        .map(|ph| {
            if ph.starts_with('[') {
                ph
            } else {
                format!("[{}]", ph)
            }
        })
        .collect();
    if !phonetics.is_empty() {
        lines.push(phonetics.join(" "));
    }

    // ht_pos precedes the ht_trs it labels
    let mut pos = String::new();
    for span in fragment.select(&selector("span.ht_pos, span.ht_trs")?) {
        let text = element_text(span);
        if span.value().classes().any(|class| class == "ht_pos") {
            pos = text;
            continue;
        }
        if !text.is_empty() {
            lines.push(format!("{} {}", pos, text).trim().to_string());
        }
        pos.clear();
    }

    Ok(lines)
}

/// Bing dictionary engine
#[derive(Clone)]
pub struct BingTranslator {
    client: HttpClient,
    base_url: String,
}

impl BingTranslator {
    /// Engine with its own session
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let client = HttpClient::new(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Engine over an existing client
    pub fn with_client(client: HttpClient, config: &TranslatorConfig) -> Self {
        Self {
            client: client.with_default_user_agent(BROWSER_AGENT),
            base_url: base_url(config.host.as_deref(), BING_HOST),
        }
    }

    /// Hover-translation URL for `text`
    pub fn build_url(&self, text: &str) -> String {
        format!(
            "{}/dict/SerpHoverTrans?q={}",
            self.base_url,
            url_encode(text, true)
        )
    }
}

impl TranslationEngine for BingTranslator {
    fn name(&self) -> &'static str {
        "bing"
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn prepare(&self, request: &TranslationRequest) -> Result<HttpRequest> {
        Ok(HttpRequest::get(self.build_url(&request.text))
            .with_header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .with_header("Accept-Language", "en-US,en;q=0.5"))
    }

    fn decode(
        &self,
        request: &TranslationRequest,
        response: &HttpResponse,
    ) -> Result<TranslationResult> {
        let lines = parse_hover(response.text())?;
        if lines.is_empty() {
            return Ok(TranslationResult::failure(
                self.name(),
                request,
                "no dictionary entry found",
            ));
        }

        Ok(TranslationResult::success(self.name(), request, lines.join("\n")))
    }
}
