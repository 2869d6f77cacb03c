// Public modules
pub mod categorizer;
pub mod config;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod projector;
pub mod relay;
pub mod search;
pub mod server;

// Re-export commonly used types
pub use categorizer::{Categorizer, CategorizeError, Classifier, GrokClient};
pub use config::Config;
pub use io::{get_default_bundles_dir, load_profiles, save_bundle};
pub use models::{CategorizedResult, Category, OutputBundle, SearchHit, UserProfile};
pub use pipeline::Pipeline;
pub use projector::OutputProjector;
pub use relay::WebhookRelay;
pub use search::{DuckDuckGoProvider, RawRecord, ResultFetcher, SearchError, SearchProvider};
