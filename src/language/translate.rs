//! Translation bridging over an installed language-pair catalog.

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Minimum length a translation must exceed before it is trusted.
///
/// A translator that silently passes text through, or collapses it to a
/// fragment, must not be presented as a real translation.
pub const MIN_TRANSLATED_CHARS: usize = 20;

/// An installed translation direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationDirection {
    pub from: String,
    pub to: String,
}

impl TranslationDirection {
    /// Create a direction from a language-code pair.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Trait for bridging text between two languages.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `from` to `to`.
    ///
    /// Never fails: a missing direction, an unreachable service, or a
    /// same-language pair all return the input unchanged. Callers must treat
    /// output identical to the input as *not translated*.
    async fn translate(&self, text: &str, from: &str, to: &str) -> String;
}

/// Translate with the accept-only-if-real guard.
///
/// Returns `Some` only when the pair differs, the output differs from the
/// input, and the output exceeds [`MIN_TRANSLATED_CHARS`]. Callers fall back
/// to the original text on `None`.
pub async fn translate_guarded(
    translator: &dyn Translator,
    text: &str,
    from: &str,
    to: &str,
) -> Option<String> {
    if from == to || text.is_empty() {
        return None;
    }

    let translated = translator.translate(text, from, to).await;
    if translated != text && translated.chars().count() > MIN_TRANSLATED_CHARS {
        Some(translated)
    } else {
        None
    }
}

/// Translator that always passes text through unchanged.
///
/// Used when no translation endpoint is configured.
#[derive(Debug, Default)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str, _from: &str, _to: &str) -> String {
        text.to_string()
    }
}

/// Translator backed by a LibreTranslate-compatible HTTP endpoint.
///
/// The installed-direction catalog is fetched lazily from `/languages` on
/// first use and cached for the life of the process. An unreachable endpoint
/// degrades to an empty catalog, which makes every call a pass-through.
pub struct HttpTranslator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    catalog: OnceCell<HashSet<TranslationDirection>>,
}

#[derive(Deserialize)]
struct InstalledLanguage {
    code: String,
    #[serde(default)]
    targets: Vec<String>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl HttpTranslator {
    /// Create a translator for the given endpoint.
    pub fn new(endpoint: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            catalog: OnceCell::new(),
        }
    }

    async fn catalog(&self) -> &HashSet<TranslationDirection> {
        self.catalog
            .get_or_init(|| async {
                match self.fetch_catalog().await {
                    Ok(directions) => {
                        debug!("Translation catalog: {} directions", directions.len());
                        directions
                    }
                    Err(e) => {
                        warn!("Failed to load translation catalog: {}", e);
                        HashSet::new()
                    }
                }
            })
            .await
    }

    async fn fetch_catalog(&self) -> Result<HashSet<TranslationDirection>> {
        let languages: Vec<InstalledLanguage> = self
            .client
            .get(format!("{}/languages", self.endpoint))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(languages
            .into_iter()
            .flat_map(|InstalledLanguage { code, targets }| {
                targets
                    .into_iter()
                    .map(move |target| TranslationDirection::new(code.clone(), target))
            })
            .collect())
    }

    async fn request_translation(&self, text: &str, from: &str, to: &str) -> Result<String> {
        let mut body = serde_json::json!({
            "q": text,
            "source": from,
            "target": to,
            "format": "text",
        });
        if let Some(key) = &self.api_key {
            body["api_key"] = serde_json::Value::String(key.clone());
        }

        let response: TranslateResponse = self
            .client
            .post(format!("{}/translate", self.endpoint))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.translated_text)
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, from: &str, to: &str) -> String {
        if from == to {
            return text.to_string();
        }

        if !self.catalog().await.contains(&TranslationDirection::new(from, to)) {
            debug!("No installed direction {} -> {}", from, to);
            return text.to_string();
        }

        match self.request_translation(text, from, to).await {
            Ok(translated) if !translated.is_empty() => translated,
            Ok(_) => text.to_string(),
            Err(e) => {
                warn!("Translation {} -> {} failed: {}", from, to, e);
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Translator that prefixes text for one installed pair only.
    struct OnePairTranslator;

    #[async_trait]
    impl Translator for OnePairTranslator {
        async fn translate(&self, text: &str, from: &str, to: &str) -> String {
            if from == "en" && to == "hi" {
                format!("अनुवादित संस्करण जो काफ़ी लंबा है: {}", text)
            } else {
                text.to_string()
            }
        }
    }

    #[tokio::test]
    async fn test_passthrough_returns_input() {
        let t = PassthroughTranslator;
        assert_eq!(t.translate("hello there", "en", "hi").await, "hello there");
    }

    #[tokio::test]
    async fn test_guard_rejects_same_language_pair() {
        assert_eq!(
            translate_guarded(&OnePairTranslator, "some text", "en", "en").await,
            None
        );
    }

    #[tokio::test]
    async fn test_guard_rejects_passthrough_output() {
        assert_eq!(
            translate_guarded(&OnePairTranslator, "some text", "hi", "en").await,
            None
        );
    }

    #[tokio::test]
    async fn test_guard_accepts_real_translation() {
        let result = translate_guarded(&OnePairTranslator, "the sky is blue", "en", "hi").await;
        assert!(result.unwrap().contains("the sky is blue"));
    }

    #[tokio::test]
    async fn test_guard_rejects_short_output() {
        // A "translation" short enough to be a fragment is not trusted.
        struct Truncating;

        #[async_trait]
        impl Translator for Truncating {
            async fn translate(&self, _text: &str, _from: &str, _to: &str) -> String {
                "ok".to_string()
            }
        }

        assert_eq!(
            translate_guarded(&Truncating, "a longer input sentence", "en", "hi").await,
            None
        );
    }

    #[test]
    fn test_direction_equality() {
        let mut set = HashSet::new();
        set.insert(TranslationDirection::new("en", "hi"));
        assert!(set.contains(&TranslationDirection::new("en", "hi")));
        assert!(!set.contains(&TranslationDirection::new("hi", "en")));
    }
}
