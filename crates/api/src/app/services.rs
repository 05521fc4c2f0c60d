use std::sync::Arc;

use cashbook_core::{Clock, SystemClock};
use cashbook_infra::{
    ClosureEngine, InMemoryClosureStore, InMemoryMovementStore, LedgerService, ServiceConfig,
};

pub type Ledger = LedgerService<Arc<InMemoryMovementStore>, Arc<InMemoryClosureStore>>;
pub type Closures = ClosureEngine<Arc<InMemoryMovementStore>, Arc<InMemoryClosureStore>>;

/// Services shared by every handler. Both share one movement store and one
/// closure store.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub ledger: Arc<Ledger>,
    pub closures: Arc<Closures>,
}

pub fn build_services(config: ServiceConfig) -> AppServices {
    build_services_with_clock(config, Arc::new(SystemClock))
}

pub fn build_services_with_clock(config: ServiceConfig, clock: Arc<dyn Clock>) -> AppServices {
    let movements = Arc::new(InMemoryMovementStore::new());
    let closures = Arc::new(InMemoryClosureStore::new());

    AppServices {
        ledger: Arc::new(LedgerService::new(
            movements.clone(),
            closures.clone(),
            clock.clone(),
            config,
        )),
        closures: Arc::new(ClosureEngine::new(movements, closures, clock, config)),
    }
}
