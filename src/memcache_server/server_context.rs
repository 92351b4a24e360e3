use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    cache::{cache::Cache, expiry_sweeper},
    memory_store::dash_map_store::DashMapMemoryStore,
    server::timer,
};

pub struct ServerContext {
    cancellation_token: CancellationToken,
    system_timer: Arc<timer::SystemTimer>,
    store: Arc<dyn Cache + Send + Sync>,
    expiry_sweeper: Arc<expiry_sweeper::ExpirySweeper>,
}

impl ServerContext {
    pub fn get_default_server_context() -> Self {
        let cancellation_token = CancellationToken::new();
        let system_timer = Arc::new(timer::SystemTimer::new(cancellation_token.clone()));
        let store: Arc<dyn Cache + Send + Sync> =
            Arc::new(DashMapMemoryStore::new(system_timer.clone()));
        let expiry_sweeper = Arc::new(expiry_sweeper::ExpirySweeper::new(
            store.clone(),
            cancellation_token.clone(),
        ));
        Self {
            cancellation_token,
            system_timer,
            store,
            expiry_sweeper,
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub fn system_timer(&self) -> Arc<timer::SystemTimer> {
        self.system_timer.clone()
    }

    pub fn store(&self) -> Arc<dyn Cache + Send + Sync> {
        self.store.clone()
    }

    pub fn expiry_sweeper(&self) -> Arc<expiry_sweeper::ExpirySweeper> {
        self.expiry_sweeper.clone()
    }
}
