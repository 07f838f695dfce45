//! The wire protocols a record can be encoded into.
//!
//! Each protocol is known by a canonical name plus a few aliases, so callers
//! can pick one from a config file or the command line.

use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
    Cohere,
}

struct ProviderInfo {
    provider: Provider,
    name: &'static str,
    aliases: &'static [&'static str],
}

const PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        provider: Provider::OpenAi,
        name: "openai",
        aliases: &["openai-compatible", "chat-completions"],
    },
    ProviderInfo {
        provider: Provider::Anthropic,
        name: "anthropic",
        aliases: &["claude"],
    },
    ProviderInfo {
        provider: Provider::Google,
        name: "google",
        aliases: &["google-ai", "gemini"],
    },
    ProviderInfo {
        provider: Provider::Cohere,
        name: "cohere",
        aliases: &[],
    },
];

impl Provider {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Provider> {
        let name = name.to_lowercase();
        PROVIDERS
            .iter()
            .find(|p| p.name == name || p.aliases.iter().any(|a| *a == name))
            .map(|p| p.provider)
    }

    #[must_use]
    pub fn all() -> impl Iterator<Item = Provider> {
        PROVIDERS.iter().map(|p| p.provider)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    fn info(self) -> &'static ProviderInfo {
        match self {
            Provider::OpenAi => &PROVIDERS[0],
            Provider::Anthropic => &PROVIDERS[1],
            Provider::Google => &PROVIDERS[2],
            Provider::Cohere => &PROVIDERS[3],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::from_name(s).ok_or_else(|| {
            BridgeError::config(format!(
                "Unknown provider '{s}'. Known providers: openai, anthropic, google, cohere"
            ))
        })
    }
}
