//! Translation engines, one per web service
//!
//! Every engine turns a [`TranslationRequest`] into exactly one HTTP request
//! and decodes the answer into a [`TranslationResult`]. Engines never retry
//! and never fall back to another service.

use async_trait::async_trait;
use clap::ValueEnum;
use std::fmt;
use tracing::debug;

use crate::core::client::{HttpClient, HttpRequest, HttpResponse};
use crate::core::config::TranslatorConfig;
use crate::core::errors::Result;
use crate::core::models::{TranslationRequest, TranslationResult};

pub mod baidu;
pub mod bing;
pub mod ciba;
pub mod google;
pub mod youdao;

pub use baidu::BaiduTranslator;
pub use bing::BingTranslator;
pub use ciba::CibaTranslator;
pub use google::GoogleTranslator;
pub use youdao::YoudaoTranslator;

/// Browser identity sent to services that reject unknown clients
pub(crate) const BROWSER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:59.0) Gecko/20100101 Firefox/59.0";

/// Shared contract of all translation services
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Short service name, also the configuration section name
    fn name(&self) -> &'static str;

    /// HTTP client owned by this engine
    fn client(&self) -> &HttpClient;

    /// Build the outbound request for an already resolved request
    fn prepare(&self, request: &TranslationRequest) -> Result<HttpRequest>;

    /// Decode the service answer
    fn decode(&self, request: &TranslationRequest, response: &HttpResponse)
        -> Result<TranslationResult>;

    /// Resolve `auto` languages before anything is sent
    fn resolve(&self, request: TranslationRequest) -> TranslationRequest {
        request.resolve()
    }

    /// Translate `text` from `sl` to `tl` with a single request
    async fn translate(&self, sl: &str, tl: &str, text: &str) -> Result<TranslationResult> {
        let request = self.resolve(TranslationRequest::new(sl, tl, text));
        debug!(
            "{}: {} -> {} ({} chars)",
            self.name(),
            request.source_lang,
            request.target_lang,
            request.text.chars().count()
        );

        let http_request = self.prepare(&request)?;
        let response = self.client().send(http_request).await?;
        self.decode(&request, &response)
    }
}

/// Service selector used by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Google translate
    Google,
    /// Bing dictionary
    Bing,
    /// Baidu open API
    Baidu,
    /// Youdao web translator
    Youdao,
    /// iciba translator
    Ciba,
}

impl EngineKind {
    /// Every supported engine
    pub const ALL: [EngineKind; 5] = [
        EngineKind::Google,
        EngineKind::Bing,
        EngineKind::Baidu,
        EngineKind::Youdao,
        EngineKind::Ciba,
    ];

    /// Name used on the command line and as config section
    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Google => "google",
            EngineKind::Bing => "bing",
            EngineKind::Baidu => "baidu",
            EngineKind::Youdao => "youdao",
            EngineKind::Ciba => "ciba",
        }
    }

    /// One-line description for `engines`
    pub fn description(&self) -> &'static str {
        match self {
            EngineKind::Google => "Google Translate (translate.google.cn)",
            EngineKind::Bing => "Bing dictionary hover translation",
            EngineKind::Baidu => "Baidu translate open API (needs app_id/app_key)",
            EngineKind::Youdao => "Youdao web translator",
            EngineKind::Ciba => "iciba (Kingsoft) translator",
        }
    }

    /// Construct the engine with its own HTTP session
    pub fn create(&self, config: &TranslatorConfig) -> Result<Box<dyn TranslationEngine>> {
        let engine: Box<dyn TranslationEngine> = match self {
            EngineKind::Google => Box::new(GoogleTranslator::new(config)?),
            EngineKind::Bing => Box::new(BingTranslator::new(config)?),
            EngineKind::Baidu => Box::new(BaiduTranslator::new(config)?),
            EngineKind::Youdao => Box::new(YoudaoTranslator::new(config)?),
            EngineKind::Ciba => Box::new(CibaTranslator::new(config)?),
        };
        Ok(engine)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Base URL for a service: the configured host, or `default`
///
/// A host with a scheme is used verbatim, a bare host gets `https://`.
pub(crate) fn base_url(host: Option<&str>, default: &str) -> String {
    let host = host.unwrap_or(default).trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

/// Primary language subtag, lowercased: `en-US` -> `en`
pub(crate) fn primary_subtag(lang: &str) -> String {
    lang.split(['-', '_'])
        .next()
        .unwrap_or(lang)
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(base_url(None, "cn.bing.com"), "https://cn.bing.com");
        assert_eq!(base_url(Some("example.org/"), "cn.bing.com"), "https://example.org");
        assert_eq!(
            base_url(Some("http://127.0.0.1:8080"), "cn.bing.com"),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_primary_subtag() {
        assert_eq!(primary_subtag("en-US"), "en");
        assert_eq!(primary_subtag("zh_CN"), "zh");
        assert_eq!(primary_subtag("JA"), "ja");
    }

    #[test]
    fn test_engine_names_round_trip() {
        for kind in EngineKind::ALL {
            let parsed = EngineKind::from_str(kind.name(), true).unwrap();
            assert_eq!(parsed, kind);
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn test_create_engines() {
        let config = TranslatorConfig::default();
        for kind in [
            EngineKind::Google,
            EngineKind::Bing,
            EngineKind::Youdao,
            EngineKind::Ciba,
        ] {
            let engine = kind.create(&config).unwrap();
            assert_eq!(engine.name(), kind.name());
        }

        // Baidu cannot work without credentials
        assert!(EngineKind::Baidu.create(&config).is_err());

        let config = TranslatorConfig {
            app_id: Some("id".to_string()),
            app_key: Some("key".to_string()),
            ..Default::default()
        };
        assert_eq!(EngineKind::Baidu.create(&config).unwrap().name(), "baidu");
    }
}
