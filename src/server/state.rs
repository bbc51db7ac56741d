use crate::ai::TextAugmenter;
use crate::auth::TokenSigner;
use crate::db::Database;
use std::sync::Arc;

/// Shared handles every request handler receives.
///
/// Everything in here is either a pool or read-only after startup, so cloning
/// per request is cheap and nothing request-scoped lives here.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub augmenter: Arc<dyn TextAugmenter>,
    pub tokens: Arc<TokenSigner>,
    pub require_token: bool,
}

impl AppState {
    pub fn new(
        db: Database,
        augmenter: Arc<dyn TextAugmenter>,
        tokens: TokenSigner,
        require_token: bool,
    ) -> Self {
        Self {
            db,
            augmenter,
            tokens: Arc::new(tokens),
            require_token,
        }
    }
}
