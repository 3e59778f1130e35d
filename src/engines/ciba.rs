//! iciba (Kingsoft) translator engine

use serde::Deserialize;
use serde_json::Value;

use crate::core::client::{HttpClient, HttpRequest, HttpResponse};
use crate::core::config::TranslatorConfig;
use crate::core::errors::Result;
use crate::core::models::{is_auto, TranslationRequest, TranslationResult};
use crate::engines::{base_url, primary_subtag, TranslationEngine, BROWSER_AGENT};

const CIBA_HOST: &str = "fy.iciba.com";
const CIBA_PATH: &str = "/ajax.php?a=fy";

fn ciba_lang(lang: &str) -> String {
    if is_auto(lang) {
        "auto".to_string()
    } else {
        primary_subtag(lang)
    }
}

#[derive(Debug, Deserialize)]
struct CibaResponse {
    content: Option<CibaContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CibaContent {
    out: Option<String>,
    ph_en: Option<String>,
    #[serde(default)]
    word_mean: Vec<String>,
}

/// Ciba engine
#[derive(Clone)]
pub struct CibaTranslator {
    client: HttpClient,
    url: String,
}

impl CibaTranslator {
    /// Engine with its own session
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let client = HttpClient::new(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Engine over an existing client
    pub fn with_client(client: HttpClient, config: &TranslatorConfig) -> Self {
        Self {
            client: client.with_default_user_agent(BROWSER_AGENT),
            url: format!("{}{}", base_url(config.host.as_deref(), CIBA_HOST), CIBA_PATH),
        }
    }
}

impl TranslationEngine for CibaTranslator {
    fn name(&self) -> &'static str {
        "ciba"
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn prepare(&self, request: &TranslationRequest) -> Result<HttpRequest> {
        Ok(HttpRequest::post(self.url.as_str()).with_data(&[
            ("a", "fy".to_string()),
            ("f", ciba_lang(&request.source_lang)),
            ("t", ciba_lang(&request.target_lang)),
            ("w", request.text.clone()),
        ]))
    }

    fn decode(
        &self,
        request: &TranslationRequest,
        response: &HttpResponse,
    ) -> Result<TranslationResult> {
        let raw: Value = response.json()?;
        let decoded: CibaResponse = serde_json::from_value(raw.clone())?;
        let content = decoded.content.unwrap_or_default();

        let translation = match content.out.as_deref().map(str::trim) {
            Some(out) if !out.is_empty() => out.to_string(),
            _ => {
                let means: Vec<String> = content
                    .word_mean
                    .iter()
                    .map(|mean| mean.trim().to_string())
                    .filter(|mean| !mean.is_empty())
                    .collect();
                match content.ph_en.as_deref().filter(|ph| !ph.is_empty()) {
                    // phonetics alone are not a translation
                    _ if means.is_empty() => String::new(),
                    Some(ph) => format!("[{}]\n{}", ph, means.join("\n")),
                    None => means.join("\n"),
                }
            }
        };

        let result = if translation.is_empty() {
            TranslationResult::failure(self.name(), request, "no translation in response")
        } else {
            TranslationResult::success(self.name(), request, translation)
        };

        Ok(result.with_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::tests::{bypass_proxy_for_loopback, StubTransport};
    use crate::core::errors::TranslationError;
    use std::time::{Duration, Instant};

    fn translator(stub: std::sync::Arc<StubTransport>) -> CibaTranslator {
        let config = TranslatorConfig::default();
        CibaTranslator::with_client(HttpClient::with_transport(stub, &config), &config)
    }

    #[tokio::test]
    async fn test_translate_sentence() {
        let stub = StubTransport::new(
            r#"{"status":1,"content":{"from":"en-EU","to":"zh-CN","vendor":"ciba","out":"你好，世界","ci_ai":0,"err_no":0}}"#,
        );
        let ciba = translator(stub.clone());

        let result = ciba.translate("auto", "auto", "Hello, world").await.unwrap();

        let sent = stub.last_request();
        assert_eq!(sent.url, "https://fy.iciba.com/ajax.php?a=fy");
        assert!(sent.data.contains(&("f".to_string(), "en".to_string())));
        assert!(sent.data.contains(&("t".to_string(), "zh".to_string())));
        assert!(sent.data.contains(&("w".to_string(), "Hello, world".to_string())));
        assert_eq!(result.translation.as_deref(), Some("你好，世界"));
    }

    #[tokio::test]
    async fn test_translate_word() {
        let stub = StubTransport::new(
            r#"{"status":0,"content":{"ph_en":"həˈləʊ","ph_am":"hɛˈloʊ","word_mean":["int. 喂；哈罗","n. 表示问候， 惊奇或唤起注意时的用语"]}}"#,
        );
        let ciba = translator(stub);

        let result = ciba.translate("en", "zh-CN", "hello").await.unwrap();
        assert_eq!(
            result.translation.as_deref(),
            Some("[həˈləʊ]\nint. 喂；哈罗\nn. 表示问候， 惊奇或唤起注意时的用语")
        );
    }

    #[tokio::test]
    async fn test_empty_content() {
        let stub = StubTransport::new(r#"{"status":0,"content":{"ph_en":"x"}}"#);
        let ciba = translator(stub);

        let result = ciba.translate("en", "zh-CN", "x").await.unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_timeout_yields_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        bypass_proxy_for_loopback();
        let config = TranslatorConfig {
            timeout: Some(0.3),
            host: Some(format!("http://{}", addr)),
            ..Default::default()
        };
        let ciba = CibaTranslator::new(&config).unwrap();

        let started = Instant::now();
        let outcome = ciba.translate("en", "zh-CN", "hello").await;

        assert!(matches!(outcome, Err(TranslationError::NetworkError { .. })), "{:?}", outcome);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
