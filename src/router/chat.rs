//! Chat provider selection with primary-to-secondary fallback.

use chrono::NaiveDate;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::fallback::{first_success, FallbackOutcome, Named};
use super::prompt::{system_clock, system_prompt, Clock};
use crate::error::Error;
use crate::providers::{ChatPrompt, ChatProvider};

/// Reply used when the secondary provider was requested but has no key.
pub const SECONDARY_MISSING: &str = "Groq API Key is missing. Please add it to .env!";
/// Reply used when neither chat provider has a key.
pub const NO_CHAT_KEYS: &str = "No API keys found for Gemini or Groq.";

/// Which of the two chat providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSlot {
    /// Gemini
    Primary,
    /// Groq
    Secondary,
}

impl ChatSlot {
    /// Parse the wire `model` field: `"gemini"` or `"groq"`.
    pub fn from_model(model: &str) -> Option<Self> {
        match model {
            "gemini" => Some(ChatSlot::Primary),
            "groq" => Some(ChatSlot::Secondary),
            _ => None,
        }
    }
}

/// Result of routing one chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResult {
    /// Reply text, or a user-visible explanation when no provider answered.
    pub text: String,
    /// Provider that produced `text`, if any did.
    pub answered_by: Option<ChatSlot>,
    pub fallback_occurred: bool,
}

impl ChatResult {
    fn answered(text: String, slot: ChatSlot, fallback_occurred: bool) -> Self {
        Self {
            text,
            answered_by: Some(slot),
            fallback_occurred,
        }
    }

    fn unanswered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            answered_by: None,
            fallback_occurred: false,
        }
    }
}

/// Message shown for unexpected failures that have no dedicated wording.
pub fn technical_snag(detail: impl std::fmt::Display) -> String {
    format!("I hit a technical snag: {}", detail)
}

struct ChatCandidate {
    slot: ChatSlot,
    provider: Arc<dyn ChatProvider>,
}

impl Named for ChatCandidate {
    fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

/// Routes chat messages to Gemini or Groq.
///
/// Holds read-only provider handles built at startup.
#[derive(Clone)]
pub struct ChatRouter {
    primary: Option<Arc<dyn ChatProvider>>,
    secondary: Option<Arc<dyn ChatProvider>>,
    clock: Clock,
}

impl ChatRouter {
    pub fn new(
        primary: Option<Arc<dyn ChatProvider>>,
        secondary: Option<Arc<dyn ChatProvider>>,
    ) -> Self {
        Self {
            primary,
            secondary,
            clock: system_clock(),
        }
    }

    /// Replace the date source used for the birthday check.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary.is_some()
    }

    /// Whether any chat provider has a key.
    pub fn is_configured(&self) -> bool {
        self.has_primary() || self.has_secondary()
    }

    /// Ordered providers to try for `preference`.
    fn plan(&self, preference: ChatSlot) -> Vec<ChatCandidate> {
        let secondary = self.secondary.clone().map(|provider| ChatCandidate {
            slot: ChatSlot::Secondary,
            provider,
        });

        match (preference, &self.primary) {
            (ChatSlot::Primary, Some(primary)) => std::iter::once(ChatCandidate {
                slot: ChatSlot::Primary,
                provider: primary.clone(),
            })
            .chain(secondary)
            .collect(),
            _ => secondary.into_iter().collect(),
        }
    }

    /// Route one message. Never fails: every outcome is a `ChatResult`.
    pub async fn route(&self, message: &str, preference: ChatSlot) -> ChatResult {
        match AssertUnwindSafe(self.route_inner(message, preference))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                tracing::error!(error = %detail, "Chat routing panicked");
                ChatResult::unanswered(technical_snag(detail))
            }
        }
    }

    async fn route_inner(&self, message: &str, preference: ChatSlot) -> ChatResult {
        let prompt = ChatPrompt {
            system: system_prompt((self.clock)()),
            message: message.to_string(),
        };

        let plan = self.plan(preference);
        tracing::debug!(
            preference = ?preference,
            plan = ?plan.iter().map(|c| c.provider_name()).collect::<Vec<_>>(),
            "Chat plan"
        );

        let run = first_success(&plan, |candidate| {
            let provider = candidate.provider.clone();
            let prompt = prompt.clone();
            async move {
                let text = provider.complete(&prompt).await?;
                if text.trim().is_empty() {
                    return Err(Error::MalformedResponse {
                        provider: provider.name(),
                        detail: "empty completion".to_string(),
                    });
                }
                Ok::<String, Error>(text)
            }
        })
        .await;

        match run.outcome {
            FallbackOutcome::Served { index: 0, value } => {
                ChatResult::answered(value, plan[0].slot, false)
            }
            FallbackOutcome::Served { index, value } => {
                let primary = plan[0].provider.name();
                let fallback = &plan[index];
                tracing::warn!(
                    from = primary,
                    to = fallback.provider.name(),
                    "Answered by fallback provider"
                );
                let text = format!(
                    "{}\n\n*(Answered by {} ⚡ due to {} traffic)*",
                    value,
                    fallback.provider.name(),
                    primary
                );
                ChatResult::answered(text, fallback.slot, true)
            }
            FallbackOutcome::Exhausted { last_error } => {
                let primary_only = plan.len() == 1 && plan[0].slot == ChatSlot::Primary;
                if primary_only {
                    ChatResult::unanswered(format!(
                        "{} is currently overloaded (Quota Exceeded) and Groq is unavailable. Error: {}",
                        plan[0].provider.name(),
                        last_error
                    ))
                } else {
                    ChatResult::unanswered(technical_snag(last_error))
                }
            }
            FallbackOutcome::NoCandidates => match preference {
                ChatSlot::Secondary => ChatResult::unanswered(SECONDARY_MISSING),
                ChatSlot::Primary => ChatResult::unanswered(NO_CHAT_KEYS),
            },
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
