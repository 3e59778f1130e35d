//! Baidu translate open API engine

use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::core::client::{HttpClient, HttpRequest, HttpResponse};
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{guess_language, is_auto, TranslationRequest, TranslationResult};
use crate::engines::{base_url, primary_subtag, TranslationEngine};

const BAIDU_HOST: &str = "fanyi-api.baidu.com";
const BAIDU_PATH: &str = "/api/trans/vip/translate";

/// Code Baidu reports for a successful call
const SUCCESS_CODE: &str = "52000";

/// Request signature: `md5(appid + q + salt + key)`
pub fn sign(app_id: &str, text: &str, salt: &str, key: &str) -> String {
    format!("{:x}", md5::compute(format!("{}{}{}{}", app_id, text, salt, key)))
}

/// Map a BCP 47-ish code to Baidu's own language codes
pub fn baidu_lang(lang: &str) -> String {
    if is_auto(lang) {
        return "auto".to_string();
    }

    match lang.to_ascii_lowercase().as_str() {
        "zh-tw" | "zh-hk" | "zh-hant" => return "cht".to_string(),
        "yue" | "wyw" => return lang.to_ascii_lowercase(),
        _ => {}
    }

    match primary_subtag(lang).as_str() {
        "zh" => "zh".to_string(),
        "ja" => "jp".to_string(),
        "ko" => "kor".to_string(),
        "fr" => "fra".to_string(),
        "es" => "spa".to_string(),
        "ar" => "ara".to_string(),
        "bg" => "bul".to_string(),
        "et" => "est".to_string(),
        "da" => "dan".to_string(),
        "fi" => "fin".to_string(),
        "ro" => "rom".to_string(),
        "sl" => "slo".to_string(),
        "sv" => "swe".to_string(),
        "vi" => "vie".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct BaiduResponse {
    from: Option<String>,
    to: Option<String>,
    #[serde(default)]
    trans_result: Vec<BaiduSegment>,
    error_code: Option<Value>,
    error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BaiduSegment {
    dst: String,
}

/// Baidu engine, needs `app_id` and `app_key`
#[derive(Clone)]
pub struct BaiduTranslator {
    client: HttpClient,
    url: String,
    app_id: String,
    app_key: String,
}

impl BaiduTranslator {
    /// Engine with its own session; needs `app_id` and `app_key`
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let client = HttpClient::new(config)?;
        Self::with_client(client, config)
    }

    /// Engine over an existing client
    pub fn with_client(client: HttpClient, config: &TranslatorConfig) -> Result<Self> {
        let app_id = config
            .app_id
            .clone()
            .ok_or_else(|| TranslationError::config("baidu requires app_id"))?;
        let app_key = config
            .app_key
            .clone()
            .ok_or_else(|| TranslationError::config("baidu requires app_key"))?;

        Ok(Self {
            client,
            url: format!("{}{}", base_url(config.host.as_deref(), BAIDU_HOST), BAIDU_PATH),
            app_id,
            app_key,
        })
    }

    /// Form fields for one query, signed with `salt`
    pub fn form(&self, request: &TranslationRequest, salt: &str) -> Vec<(String, String)> {
        vec![
            ("q".to_string(), request.text.clone()),
            ("from".to_string(), baidu_lang(&request.source_lang)),
            ("to".to_string(), baidu_lang(&request.target_lang)),
            ("appid".to_string(), self.app_id.clone()),
            ("salt".to_string(), salt.to_string()),
            (
                "sign".to_string(),
                sign(&self.app_id, &request.text, salt, &self.app_key),
            ),
        ]
    }
}

impl TranslationEngine for BaiduTranslator {
    fn name(&self) -> &'static str {
        "baidu"
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    /// The API needs an explicit target language
    fn resolve(&self, request: TranslationRequest) -> TranslationRequest {
        let mut request = request.resolve();
        if is_auto(&request.target_lang) {
            request.target_lang = guess_language(&request.text).1.to_string();
        }
        request
    }

    fn prepare(&self, request: &TranslationRequest) -> Result<HttpRequest> {
        let salt = rand::rng().random_range(32768..65536).to_string();
        Ok(HttpRequest::post(self.url.as_str()).with_data(&self.form(request, &salt)))
    }

    fn decode(
        &self,
        request: &TranslationRequest,
        response: &HttpResponse,
    ) -> Result<TranslationResult> {
        let raw: Value = response.json()?;
        let decoded: BaiduResponse = serde_json::from_value(raw.clone())?;

        if let Some(code) = &decoded.error_code {
            let code = match code {
                Value::String(code) => code.clone(),
                other => other.to_string(),
            };
            if code != SUCCESS_CODE {
                debug!("baidu refused the request: {}", code);
                let message = decoded.error_msg.unwrap_or_default();
                return Ok(TranslationResult::failure(
                    self.name(),
                    request,
                    format!("{}: {}", code, message),
                )
                .with_raw(raw));
            }
        }

        let translation = decoded
            .trans_result
            .iter()
            .map(|segment| segment.dst.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let result = if translation.is_empty() {
            TranslationResult::failure(self.name(), request, "empty translation")
        } else {
            TranslationResult::success(self.name(), request, translation)
        };

        Ok(result
            .with_languages(
                decoded.from.unwrap_or_else(|| request.source_lang.clone()),
                decoded.to.unwrap_or_else(|| request.target_lang.clone()),
            )
            .with_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::tests::StubTransport;
    use crate::core::client::Method;
    use std::collections::HashMap;

    fn config() -> TranslatorConfig {
        TranslatorConfig {
            app_id: Some("2015063000000001".to_string()),
            app_key: Some("12345678".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_sign_matches_reference() {
        assert_eq!(
            sign("2015063000000001", "apple", "1435660288", "12345678"),
            "f89f9594663708c1605f3d736d01d2d4"
        );
    }

    #[test]
    fn test_language_mapping() {
        assert_eq!(baidu_lang("auto"), "auto");
        assert_eq!(baidu_lang("zh-CN"), "zh");
        assert_eq!(baidu_lang("zh-TW"), "cht");
        assert_eq!(baidu_lang("en-US"), "en");
        assert_eq!(baidu_lang("ja"), "jp");
        assert_eq!(baidu_lang("ko-KR"), "kor");
        assert_eq!(baidu_lang("de"), "de");
    }

    #[test]
    fn test_missing_credentials() {
        assert!(matches!(
            BaiduTranslator::new(&TranslatorConfig::default()),
            Err(TranslationError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_form_fields() {
        let baidu = BaiduTranslator::new(&config()).unwrap();
        let request = TranslationRequest::new("en-US", "zh-CN", "apple");
        let form: HashMap<String, String> =
            baidu.form(&request, "1435660288").into_iter().collect();
        assert_eq!(form["from"], "en");
        assert_eq!(form["to"], "zh");
        assert_eq!(form["sign"], "f89f9594663708c1605f3d736d01d2d4");
    }

    #[tokio::test]
    async fn test_translate() {
        let stub = StubTransport::new(
            r#"{"from":"en","to":"zh","trans_result":[{"src":"apple","dst":"苹果"},{"src":"pie","dst":"派"}]}"#,
        );
        let baidu =
            BaiduTranslator::with_client(HttpClient::with_transport(stub.clone(), &config()), &config())
                .unwrap();

        let result = baidu.translate("auto", "zh-CN", "apple\npie").await.unwrap();

        let sent = stub.last_request();
        assert_eq!(sent.method, Method::Post);
        assert_eq!(sent.url, "https://fanyi-api.baidu.com/api/trans/vip/translate");
        assert!(sent.data.contains(&("from".to_string(), "auto".to_string())));

        assert!(result.success);
        assert_eq!(result.translation.as_deref(), Some("苹果\n派"));
        assert_eq!(result.source_lang, "en");
    }

    #[tokio::test]
    async fn test_target_auto_is_guessed() {
        let stub = StubTransport::new(r#"{"trans_result":[{"src":"苹果","dst":"apple"}]}"#);
        let baidu =
            BaiduTranslator::with_client(HttpClient::with_transport(stub.clone(), &config()), &config())
                .unwrap();

        baidu.translate("zh-CN", "auto", "苹果").await.unwrap();

        let sent = stub.last_request();
        assert!(sent.data.contains(&("to".to_string(), "en".to_string())));
    }

    #[tokio::test]
    async fn test_service_error() {
        let stub = StubTransport::new(r#"{"error_code":"54001","error_msg":"Invalid Sign"}"#);
        let baidu =
            BaiduTranslator::with_client(HttpClient::with_transport(stub, &config()), &config())
                .unwrap();

        let result = baidu.translate("en", "zh", "apple").await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error_info.as_deref(), Some("54001: Invalid Sign"));
        assert!(result.translation.is_none());
    }
}
