pub mod error;

pub use error::*;

use crate::database::Database;
use crate::provider::ProviderApi;
use crate::services::{SendPipeline, StatusSyncer, TriggerRegistry};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub provider: Arc<dyn ProviderApi>,
    pub syncer: StatusSyncer,
    pub pipeline: SendPipeline,
    pub triggers: TriggerRegistry,
}

impl AppState {
    pub fn new(db: Database, provider: Arc<dyn ProviderApi>) -> Self {
        let syncer = StatusSyncer::new(db.clone(), provider.clone());
        let pipeline = SendPipeline::new(db.clone(), provider.clone());
        let triggers = TriggerRegistry::new(db.clone());
        Self {
            db,
            provider,
            syncer,
            pipeline,
            triggers,
        }
    }
}
