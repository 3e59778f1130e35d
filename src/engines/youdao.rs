//! Youdao web translator engine

use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use crate::core::client::{HttpClient, HttpRequest, HttpResponse};
use crate::core::config::TranslatorConfig;
use crate::core::errors::Result;
use crate::core::models::{is_auto, TranslationRequest, TranslationResult};
use crate::engines::{base_url, primary_subtag, TranslationEngine, BROWSER_AGENT};

const YOUDAO_HOST: &str = "fanyi.youdao.com";
const YOUDAO_PATH: &str = "/translate_o?smartresult=dict&smartresult=rule";

/// Client id expected by the web endpoint
const CLIENT: &str = "fanyideskweb";

/// Key the web client mixes into every signature
const SECRET: &str = "ebSeFb%=XZ%T[KZ)c(sy!";

const COOKIE: &str = "OUTFOX_SEARCH_USER_ID=-2022895048@10.168.8.76;";
const REFERER: &str = "http://fanyi.youdao.com/";

/// Salt in the web client's format: millisecond timestamp plus one digit
pub fn make_salt(millis: i64, digit: u8) -> String {
    format!("{}{}", millis, digit)
}

/// Request signature: `md5(client + text + salt + secret)`
pub fn sign(text: &str, salt: &str) -> String {
    format!("{:x}", md5::compute(format!("{}{}{}{}", CLIENT, text, salt, SECRET)))
}

/// Map a BCP 47-ish code to Youdao's codes
pub fn youdao_lang(lang: &str) -> String {
    if is_auto(lang) {
        return "AUTO".to_string();
    }
    match primary_subtag(lang).as_str() {
        "zh" => "zh-CHS".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YoudaoResponse {
    #[serde(default)]
    error_code: i64,
    #[serde(rename = "type")]
    direction: Option<String>,
    #[serde(default)]
    translate_result: Vec<Vec<YoudaoSegment>>,
    smart_result: Option<SmartResult>,
}

#[derive(Debug, Deserialize)]
struct YoudaoSegment {
    #[serde(default)]
    tgt: String,
}

#[derive(Debug, Deserialize)]
struct SmartResult {
    #[serde(default)]
    entries: Vec<String>,
}

/// Youdao engine
#[derive(Clone)]
pub struct YoudaoTranslator {
    client: HttpClient,
    url: String,
}

impl YoudaoTranslator {
    /// Engine with its own session
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let client = HttpClient::new(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Engine over an existing client
    pub fn with_client(client: HttpClient, config: &TranslatorConfig) -> Self {
        Self {
            client: client.with_default_user_agent(BROWSER_AGENT),
            url: format!("{}{}", base_url(config.host.as_deref(), YOUDAO_HOST), YOUDAO_PATH),
        }
    }

    /// Form fields for one query, signed with `salt`
    pub fn form(&self, request: &TranslationRequest, salt: &str) -> Vec<(String, String)> {
        [
            ("i", request.text.clone()),
            ("from", youdao_lang(&request.source_lang)),
            ("to", youdao_lang(&request.target_lang)),
            ("smartresult", "dict".to_string()),
            ("client", CLIENT.to_string()),
            ("salt", salt.to_string()),
            ("sign", sign(&request.text, salt)),
            ("doctype", "json".to_string()),
            ("version", "2.1".to_string()),
            ("keyfrom", "fanyi.web".to_string()),
            ("action", "FY_BY_CL1CKBUTTON".to_string()),
            ("typoResult", "false".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

impl TranslationEngine for YoudaoTranslator {
    fn name(&self) -> &'static str {
        "youdao"
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn prepare(&self, request: &TranslationRequest) -> Result<HttpRequest> {
        let salt = make_salt(
            chrono::Utc::now().timestamp_millis(),
            rand::rng().random_range(0..10),
        );
        Ok(HttpRequest::post(self.url.as_str())
            .with_data(&self.form(request, &salt))
            .with_header("Cookie", COOKIE)
            .with_header("Referer", REFERER))
    }

    fn decode(
        &self,
        request: &TranslationRequest,
        response: &HttpResponse,
    ) -> Result<TranslationResult> {
        let raw: Value = response.json()?;
        let decoded: YoudaoResponse = serde_json::from_value(raw.clone())?;

        if decoded.error_code != 0 {
            return Ok(TranslationResult::failure(
                self.name(),
                request,
                format!("youdao error code {}", decoded.error_code),
            )
            .with_raw(raw));
        }

        let mut translation = decoded
            .translate_result
            .iter()
            .map(|paragraph| {
                paragraph
                    .iter()
                    .map(|segment| segment.tgt.as_str())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");

        let entries: Vec<&str> = decoded
            .smart_result
            .as_ref()
            .map(|smart| {
                smart
                    .entries
                    .iter()
                    .map(|entry| entry.trim())
                    .filter(|entry| !entry.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if !entries.is_empty() {
            translation.push_str("\n=========\n");
            translation.push_str(&entries.join("\n"));
        }

        let result = if translation.is_empty() {
            TranslationResult::failure(self.name(), request, "empty translation")
        } else {
            TranslationResult::success(self.name(), request, translation)
        };

        // "en2zh-CHS" names the direction the service picked
        let result = match decoded.direction.as_deref().and_then(|d| d.split_once('2')) {
            Some((from, to)) => result.with_languages(from, to),
            None => result,
        };

        Ok(result.with_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::tests::StubTransport;
    use crate::core::client::Method;

    fn translator(stub: std::sync::Arc<StubTransport>) -> YoudaoTranslator {
        let config = TranslatorConfig::default();
        YoudaoTranslator::with_client(HttpClient::with_transport(stub, &config), &config)
    }

    #[test]
    fn test_sign() {
        let salt = make_salt(1560987284000, 3);
        assert_eq!(salt, "15609872840003");
        assert_eq!(sign("hello", &salt), "b970dccacab04f56156d43584ea2b039");
    }

    #[test]
    fn test_language_mapping() {
        assert_eq!(youdao_lang("auto"), "AUTO");
        assert_eq!(youdao_lang("zh-CN"), "zh-CHS");
        assert_eq!(youdao_lang("en-US"), "en");
        assert_eq!(youdao_lang("ja"), "ja");
    }

    #[tokio::test]
    async fn test_translate_word() {
        let stub = StubTransport::new(
            r#"{"type":"en2zh-CHS","errorCode":0,"elapsedTime":1,
                "smartResult":{"type":1,"entries":["","n. 吻；轻触\r\n","v. 吻\r\n"]},
                "translateResult":[[{"src":"kiss","tgt":"吻"}]]}"#,
        );
        let youdao = translator(stub.clone());

        let result = youdao.translate("auto", "auto", "kiss").await.unwrap();

        let sent = stub.last_request();
        assert_eq!(sent.method, Method::Post);
        assert_eq!(
            sent.url,
            "https://fanyi.youdao.com/translate_o?smartresult=dict&smartresult=rule"
        );
        assert!(sent.data.contains(&("from".to_string(), "en".to_string())));
        assert!(sent.data.contains(&("to".to_string(), "zh-CHS".to_string())));
        assert_eq!(sent.header("Referer"), Some(REFERER));

        assert!(result.success);
        assert_eq!(
            result.translation.as_deref(),
            Some("吻\n=========\nn. 吻；轻触\nv. 吻")
        );
        assert_eq!(result.source_lang, "en");
        assert_eq!(result.target_lang, "zh-CHS");
    }

    #[tokio::test]
    async fn test_translate_paragraphs() {
        let stub = StubTransport::new(
            r#"{"errorCode":0,"translateResult":[[{"tgt":"你好，"},{"tgt":"世界。"}],[{"tgt":"再见。"}]]}"#,
        );
        let youdao = translator(stub);

        let result = youdao.translate("en", "zh-CN", "Hello, world.\nBye.").await.unwrap();
        assert_eq!(result.translation.as_deref(), Some("你好，世界。\n再见。"));
        assert_eq!(result.target_lang, "zh-CN");
    }

    #[tokio::test]
    async fn test_error_code() {
        let stub = StubTransport::new(r#"{"errorCode":50}"#);
        let youdao = translator(stub);

        let result = youdao.translate("en", "zh-CN", "hello").await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error_info.as_deref(), Some("youdao error code 50"));
    }
}
