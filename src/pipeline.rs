//! Guard, dispatch and compose one message, then hand it to the chat session

use crate::compose::{ComposedMessage, MessageComposer};
use crate::config::Route;
use crate::detect::LanguageDetector;
use crate::dispatch::{DispatchEngine, TranslationRequest};
use crate::error::TranslateResult;
use crate::guard::{GuardDecision, LanguageGuard};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, info};

/// Prefix of the relay's own chat commands, parsed elsewhere
pub const COMMAND_PREFIX: &str = ".tt-";

/// Whether an outgoing message is ordinary text we may translate
///
/// Bot commands (`/start`), userbot commands (`,help`) and the relay's own
/// `.tt-` commands are left alone.
pub fn should_translate(text: &str) -> bool {
    let text = text.trim();
    !(text.is_empty()
        || text.starts_with('/')
        || text.starts_with(',')
        || text.starts_with(COMMAND_PREFIX))
}

/// The chat-session side: applies a composed message to an existing message
#[async_trait]
pub trait MessageEditor: Send + Sync {
    type MessageId: Send + Sync;

    async fn edit_message(
        &self,
        message_id: &Self::MessageId,
        message: &ComposedMessage,
    ) -> TranslateResult<()>;
}

pub struct TranslationPipeline<D> {
    guard: LanguageGuard<D>,
    engine: DispatchEngine,
    composer: MessageComposer,
}

impl<D: LanguageDetector> TranslationPipeline<D> {
    pub fn new(guard: LanguageGuard<D>, engine: DispatchEngine, composer: MessageComposer) -> Self {
        Self {
            guard,
            engine,
            composer,
        }
    }

    /// Translate `text` along `route`; `None` means there is nothing to edit
    pub async fn translate(&self, text: &str, route: &Route) -> Option<ComposedMessage> {
        let start = Instant::now();
        let request = TranslationRequest::new(text, &route.source_lang, &route.target_langs);

        if let GuardDecision::ShortCircuit(reason) =
            self.guard
                .guard(request.source_text(), request.source_lang(), request.target_langs())
        {
            debug!(reason = %reason, "Skipping translation");
            return None;
        }

        let translations = self.engine.dispatch(&request).await;
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            translated = translations.len(),
            requested = request.target_langs().len(),
            "Dispatch finished"
        );

        self.composer.compose(&translations, request.target_langs())
    }

    /// Translate and, if anything came out, edit the message in place
    ///
    /// Returns whether an edit was made.
    pub async fn translate_and_edit<E: MessageEditor>(
        &self,
        editor: &E,
        message_id: &E::MessageId,
        text: &str,
        route: &Route,
    ) -> TranslateResult<bool> {
        match self.translate(text, route).await {
            Some(composed) => {
                editor.edit_message(message_id, &composed).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
