//! Error taxonomy shared by the session factory, the exchange, and the front
//! ends.

use std::error::Error;
use std::fmt;

use crate::core::constants::API_KEY_ENV_VARS;

const CREDENTIAL_QUICK_FIXES: &[&str] = &[
    "export GEMINI_API_KEY=...        # Key from Google AI Studio",
    "export API_KEY=...               # Accepted as a fallback",
];

const NO_QUICK_FIXES: &[&str] = &[];

/// Failure to build a chat session. Fatal for the lifetime of a
/// conversation: the user has to fix the environment and start again.
#[derive(Debug)]
pub enum ConfigurationError {
    /// No usable API key was found.
    MissingCredential,

    /// The HTTP client could not be constructed.
    Transport(reqwest::Error),
}

impl ConfigurationError {
    pub fn quick_fixes(&self) -> &'static [&'static str] {
        match self {
            ConfigurationError::MissingCredential => CREDENTIAL_QUICK_FIXES,
            ConfigurationError::Transport(_) => NO_QUICK_FIXES,
        }
    }

    pub fn exit_code(&self) -> i32 {
        2
    }

    /// Short text for the persistent banner shown by the terminal view.
    pub fn banner(&self) -> String {
        match self {
            ConfigurationError::MissingCredential => format!(
                "{} environment variable not set. Please set it to use the application.",
                API_KEY_ENV_VARS[0]
            ),
            ConfigurationError::Transport(_) => {
                "The HTTP client could not be initialized. See the log for details.".to_string()
            }
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::MissingCredential => write!(
                f,
                "❌ No API key configured: none of {} is set",
                API_KEY_ENV_VARS.join(", ")
            ),
            ConfigurationError::Transport(err) => {
                write!(f, "❌ Failed to initialize HTTP client: {err}")
            }
        }
    }
}

impl Error for ConfigurationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigurationError::MissingCredential => None,
            ConfigurationError::Transport(err) => Some(err),
        }
    }
}

/// Failure of a single message round-trip. Recoverable: the conversation
/// answers with a fallback message and the user may send again.
#[derive(Debug)]
pub enum ExchangeError {
    /// The message was empty after trimming; nothing was sent.
    EmptyMessage,

    /// The request never produced an HTTP response.
    Network(reqwest::Error),

    /// The API answered with an error status or refused the prompt.
    Api { status: Option<u16>, message: String },

    /// The response could not be interpreted.
    Malformed(String),
}

impl ExchangeError {
    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed(detail.into())
    }
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeError::EmptyMessage => write!(f, "message is empty"),
            ExchangeError::Network(err) => write!(f, "network error: {err}"),
            ExchangeError::Api {
                status: Some(status),
                message,
            } => write!(f, "API error ({status}): {message}"),
            ExchangeError::Api {
                status: None,
                message,
            } => write!(f, "API error: {message}"),
            ExchangeError::Malformed(detail) => write!(f, "malformed response: {detail}"),
        }
    }
}

impl Error for ExchangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExchangeError::Network(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        ExchangeError::Network(err)
    }
}
