//! Translation backends
//!
//! Each backend implements [`MachineTranslator`]. The [`ProviderRegistry`]
//! wraps them in the closed [`Backend`] enum and decides which one serves a
//! given target language.
//!
//! | Backend | Module | Credentials |
//! |---|---|---|
//! | Google Translate v2 | `google_translate` | API key |
//! | Azure Translator v3 | `azure` | key, endpoint, region |
//! | DeepLX | `deeplx` | none |
//! | OpenAI chat completions | `openai` | API key |
//! | Gemini | `gemini` | API key, model |
//! | Mock | `mock` | none |
pub mod azure;
pub mod deeplx;
pub mod gemini;
pub mod google_translate;
pub mod mock;
pub mod openai;
pub mod registry;
pub mod translator;

pub use azure::AzureTranslatorProvider;
pub use deeplx::DeepLxProvider;
pub use gemini::GeminiProvider;
pub use google_translate::GoogleTranslateProvider;
pub use mock::{MockMode, MockTranslator};
pub use openai::OpenAiProvider;
pub use registry::{Backend, BackendKind, ProviderRegistry};
pub use translator::MachineTranslator;
