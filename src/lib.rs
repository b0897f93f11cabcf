//! Translate outgoing chat messages into several languages at once
//!
//! A message goes through three stages:
//!
//! 1. [`LanguageGuard`] skips emoji-only text and text already written in a target language.
//! 2. [`DispatchEngine`] asks one backend per target language, concurrently, and keeps
//!    whatever succeeded.
//! 3. [`MessageComposer`] puts the first translation on top and the rest below it,
//!    with a block-quote span measured in UTF-16 code units.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use translate_relay::{
//!     AppConfig, DispatchEngine, LanguageGuard, MessageComposer, ProviderRegistry,
//!     TranslationPipeline, WhatlangDetector,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load("config.json")?;
//!     let registry = ProviderRegistry::from_config(&config, &reqwest::Client::new())?;
//!     let pipeline = TranslationPipeline::new(
//!         LanguageGuard::new(WhatlangDetector::new()),
//!         DispatchEngine::new(Arc::new(registry)),
//!         MessageComposer::new(config.collapsed_length),
//!     );
//!
//!     let route = config.target_config.route_for(-1001234, 42).unwrap();
//!     if let Some(message) = pipeline.translate("你好，世界", route).await {
//!         println!("{}", message.full_text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod compose;
pub mod config;
pub mod detect;
pub mod dispatch;
pub mod error;
pub mod guard;
pub mod mt;
pub mod pipeline;


pub use compose::{ComposedMessage, MessageComposer, QuoteAnnotation, code_unit_len};
pub use config::{AppConfig, Route, TargetConfig};
pub use detect::{FixedDetector, LanguageDetector, WhatlangDetector};
pub use dispatch::{DispatchEngine, DispatchReport, TranslationMap, TranslationRequest};
pub use error::{TranslateError, TranslateResult};
pub use guard::{GuardDecision, LanguageGuard, ShortCircuitReason};
pub use mt::{Backend, BackendKind, MachineTranslator, ProviderRegistry};
pub use pipeline::{MessageEditor, TranslationPipeline, should_translate};
