//! Google translate engine
//!
//! Talks to the undocumented `translate_a/single` endpoint used by the
//! browser widgets. The answer is a loosely structured nested array; it is
//! decoded into [`GoogleResponse`] before anything is rendered so that shape
//! problems surface as one [`TranslationError::ParseError`].

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::client::{url_encode, HttpClient, HttpRequest, HttpResponse};
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{TranslationRequest, TranslationResult};
use crate::engines::{TranslationEngine, BROWSER_AGENT};

const GOOGLE_HOST: &str = "translate.google.cn";

/// Response parts requested from the service
const DATA_TYPES: [&str; 10] = ["at", "bd", "ex", "ld", "md", "qca", "rw", "rm", "ss", "t"];

/// Index of the definitions block in the response array
const DEFINITIONS_INDEX: usize = 12;

const SECTION_RULE: &str = "\n=========\n";

/// One segment of the main translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryTranslation {
    /// Translated text
    pub text: String,
}

/// Alternative words for one part of speech
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymGroup {
    /// Part of speech label, e.g. `noun`
    pub part_of_speech: String,
    /// Words with their alternatives
    pub entries: Vec<SynonymEntry>,
}

/// One word and its alternatives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymEntry {
    /// Translated word
    pub word: String,
    /// Source-language words it translates
    pub synonyms: Vec<String>,
}

/// Dictionary definitions for one part of speech
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionGroup {
    /// Part of speech label
    pub part_of_speech: String,
    /// Definitions, in order
    pub definitions: Vec<Definition>,
}

/// A definition with an optional usage example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// Definition text
    pub text: String,
    /// Usage example
    pub example: Option<String>,
}

/// Decoded `translate_a/single` answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoogleResponse {
    /// Main translation segments, in order
    pub primary: Vec<PrimaryTranslation>,
    /// Element 1, grouped by part of speech
    pub synonyms: Vec<SynonymGroup>,
    /// Element 12, grouped by part of speech
    pub definitions: Vec<DefinitionGroup>,
    /// Language detected by the service
    pub source_lang: Option<String>,
}

impl GoogleResponse {
    /// Decode the nested array
    ///
    /// The top level and the translation block are validated strictly.
    /// Malformed synonym or definition entries are skipped.
    pub fn decode(value: &Value) -> Result<Self> {
        let root = value
            .as_array()
            .ok_or_else(|| TranslationError::parse("expected a top-level JSON array"))?;

        let primary = match root.first() {
            Some(Value::Array(segments)) => decode_primary(segments)?,
            Some(Value::Null) => Vec::new(),
            Some(other) => {
                return Err(TranslationError::parse(format!(
                    "translation block must be an array, got {}",
                    other
                )))
            }
            None => return Err(TranslationError::parse("response has no translation block")),
        };

        let synonyms = root
            .get(1)
            .and_then(Value::as_array)
            .map(|groups| groups.iter().filter_map(decode_synonym_group).collect())
            .unwrap_or_default();

        let definitions = if root.len() > DEFINITIONS_INDEX {
            root[DEFINITIONS_INDEX]
                .as_array()
                .map(|groups| groups.iter().filter_map(decode_definition_group).collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let source_lang = root
            .get(2)
            .and_then(Value::as_str)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string);

        Ok(Self {
            primary,
            synonyms,
            definitions,
            source_lang,
        })
    }

    /// Concatenated main translation
    pub fn translation(&self) -> String {
        self.primary.iter().map(|p| p.text.as_str()).collect()
    }

    /// Main translation followed by the synonym and definition sections
    pub fn render(&self, text: &str) -> String {
        let mut out = self.translation();

        if !self.synonyms.is_empty() {
            out.push_str(SECTION_RULE);
            out.push_str(&format!("0_0: Translations of {}\n", text));
            for group in &self.synonyms {
                // Synonym groups are labelled by initial: `n.`, `v.`
                let initial: String = group.part_of_speech.chars().take(1).collect();
                out.push_str(&format!("{}.\n", initial));
                for entry in &group.entries {
                    out.push_str(&format!("{}: {}\n", entry.word, entry.synonyms.join(", ")));
                }
            }
        }

        if !self.definitions.is_empty() {
            out.push_str(SECTION_RULE);
            out.push_str(&format!("0_0: Definitions of {}\n", text));
            for group in &self.definitions {
                out.push_str(&format!("{}.\n", group.part_of_speech));
                for definition in &group.definitions {
                    out.push_str(&format!("  - {}\n", definition.text));
                    if let Some(example) = &definition.example {
                        out.push_str(&format!("    * {}\n", example));
                    }
                }
            }
        }

        out
    }
}

fn decode_primary(segments: &[Value]) -> Result<Vec<PrimaryTranslation>> {
    let mut primary = Vec::with_capacity(segments.len());
    for segment in segments {
        let fields = segment.as_array().ok_or_else(|| {
            TranslationError::parse(format!("translation segment must be an array, got {}", segment))
        })?;
        // transliteration rows carry null in the first slot
        if let Some(text) = fields.first().and_then(Value::as_str) {
            if !text.is_empty() {
                primary.push(PrimaryTranslation {
                    text: text.to_string(),
                });
            }
        }
    }
    Ok(primary)
}

fn decode_synonym_group(group: &Value) -> Option<SynonymGroup> {
    let fields = group.as_array()?;
    let part_of_speech = fields.first()?.as_str()?.to_string();
    let entries: Vec<SynonymEntry> = fields
        .get(2)?
        .as_array()?
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_array()?;
            let word = entry.first()?.as_str()?.to_string();
            let synonyms = entry
                .get(1)?
                .as_array()?
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            Some(SynonymEntry { word, synonyms })
        })
        .collect();

    if entries.is_empty() {
        debug!("Skipping synonym group without entries: {}", part_of_speech);
        return None;
    }

    Some(SynonymGroup {
        part_of_speech,
        entries,
    })
}

fn decode_definition_group(group: &Value) -> Option<DefinitionGroup> {
    let fields = group.as_array()?;
    let part_of_speech = fields.first()?.as_str()?.to_string();
    let definitions: Vec<Definition> = fields
        .get(1)?
        .as_array()?
        .iter()
        .filter_map(|definition| {
            let definition = definition.as_array()?;
            let text = definition.first()?.as_str()?.to_string();
            let example = definition
                .get(2)
                .and_then(Value::as_str)
                .map(str::to_string);
            Some(Definition { text, example })
        })
        .collect();

    if definitions.is_empty() {
        debug!("Skipping definition group without entries: {}", part_of_speech);
        return None;
    }

    Some(DefinitionGroup {
        part_of_speech,
        definitions,
    })
}

/// Google engine
#[derive(Clone)]
pub struct GoogleTranslator {
    client: HttpClient,
}

impl GoogleTranslator {
    /// Engine with its own session; the host override is ignored
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        if let Some(host) = &config.host {
            warn!("Google engine always uses {}, ignoring host {}", GOOGLE_HOST, host);
        }
        Ok(Self::with_client(HttpClient::new(config)?))
    }

    /// Engine over an existing client
    pub fn with_client(client: HttpClient) -> Self {
        Self {
            client: client.with_default_user_agent(BROWSER_AGENT),
        }
    }

    /// Endpoint URL for one query
    pub fn build_url(&self, sl: &str, tl: &str, text: &str) -> String {
        let data_types = DATA_TYPES
            .iter()
            .map(|dt| format!("dt={}", dt))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "https://{}/translate_a/single?client=gtx&sl={}&tl={}&{}&q={}",
            GOOGLE_HOST,
            url_encode(sl, true),
            url_encode(tl, true),
            data_types,
            url_encode(text, true)
        )
    }
}

impl TranslationEngine for GoogleTranslator {
    fn name(&self) -> &'static str {
        "google"
    }

    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn prepare(&self, request: &TranslationRequest) -> Result<HttpRequest> {
        Ok(HttpRequest::get(self.build_url(
            &request.source_lang,
            &request.target_lang,
            &request.text,
        )))
    }

    fn decode(
        &self,
        request: &TranslationRequest,
        response: &HttpResponse,
    ) -> Result<TranslationResult> {
        let value: Value = response.json()?;
        let decoded = GoogleResponse::decode(&value)?;

        let source_lang = decoded
            .source_lang
            .clone()
            .unwrap_or_else(|| request.source_lang.clone());

        let rendered = decoded.render(&request.text);
        let result = if rendered.is_empty() {
            TranslationResult::failure(self.name(), request, "empty translation")
        } else {
            TranslationResult::success(self.name(), request, rendered)
        };

        Ok(result
            .with_languages(source_lang, request.target_lang.clone())
            .with_raw(value))
    }
}
