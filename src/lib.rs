//! Web Translator - command-line client for public translation services
//!
//! This library queries Google, Bing, Baidu, Youdao and Ciba with one HTTP
//! request per translation and decodes each service's answer into a
//! common [`TranslationResult`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod engines;

// Re-export key types for convenience
pub use crate::core::{
    client::{url_decode, url_encode, HttpClient, HttpRequest, HttpResponse, Session, Transport},
    config::{AppConfig, TranslatorConfig},
    errors::TranslationError,
    models::{guess_language, TranslationRequest, TranslationResult},
};

pub use engines::{
    BaiduTranslator, BingTranslator, CibaTranslator, EngineKind, GoogleTranslator,
    TranslationEngine, YoudaoTranslator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
