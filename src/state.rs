use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Settings;
use crate::pdf::extractors::ExtractorRegistry;
use crate::pipeline::credential::CredentialCipher;
use crate::services::queue::TaskQueue;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub settings: Arc<Settings>,
    pub cipher: Arc<CredentialCipher>,
    pub extractor_registry: Arc<ExtractorRegistry>,
    pub queue: TaskQueue,
}

impl AppState {
    pub fn new(pool: PgPool, settings: Settings, cipher: CredentialCipher) -> Self {
        let queue = TaskQueue::new(pool.clone());
        Self {
            pool,
            settings: Arc::new(settings),
            cipher: Arc::new(cipher),
            extractor_registry: Arc::new(ExtractorRegistry::default()),
            queue,
        }
    }
}
