use std::path::Path;

use serde::{Deserialize, Serialize};
use tagtext_ndef::{LanguageCodeMask, TextEncoding, text};

use crate::ingress::DiscoveryAction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default, deny_unknown_fields)]
pub struct TagTextConfig {
    /// Language code written into every text record
    pub language_code: String,

    /// Encoding used when writing text
    pub text_encoding: TextEncoding,

    /// How the language code length is read back, see [`LanguageCodeMask`]
    pub language_code_mask: LanguageCodeMask,

    /// Actions routed to this process while in the foreground
    pub dispatch_filters: Vec<DiscoveryAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum ConfigError {
    #[error("unable to read config file: {0}")]
    Read(String),

    #[error("unable to parse config: {0}")]
    Parse(String),

    #[error("invalid language code {0:?}, must be ASCII and at most 63 bytes")]
    InvalidLanguageCode(String),

    #[error("at least one dispatch filter is required")]
    NoDispatchFilters,

    #[error("dispatch filter {0:?} is not a tag discovery action")]
    UnrecognizedDispatchFilter(String),
}

type Error = ConfigError;
type Result<T, E = Error> = std::result::Result<T, E>;

impl Default for TagTextConfig {
    fn default() -> Self {
        Self {
            language_code: text::DEFAULT_LANGUAGE_CODE.to_string(),
            text_encoding: TextEncoding::Utf8,
            language_code_mask: LanguageCodeMask::Legacy,
            dispatch_filters: vec![DiscoveryAction::TagDiscovered],
        }
    }
}

impl TagTextConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::Read(e.to_string()))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if text::encode_with(&self.language_code, self.text_encoding, "").is_err() {
            return Err(Error::InvalidLanguageCode(self.language_code.clone()));
        }

        if self.dispatch_filters.is_empty() {
            return Err(Error::NoDispatchFilters);
        }

        // ingress ignores these, registering one would only swallow events
        if let Some(filter) = self.dispatch_filters.iter().find(|f| !f.is_recognized()) {
            return Err(Error::UnrecognizedDispatchFilter(
                filter.intent_action().to_string(),
            ));
        }

        Ok(())
    }
}

#[uniffi::export]
fn default_tag_text_config() -> TagTextConfig {
    TagTextConfig::default()
}

#[uniffi::export]
fn tag_text_config_from_json(json: String) -> Result<TagTextConfig> {
    TagTextConfig::from_json(&json)
}
