use std::sync::Arc;

use gallery_client::{gateway::ApiGateway, session::SessionStore};
use session_storage::{KeyValueStore, MemoryStore};

use super::StubServer;

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Stub API plus a gateway pointed at it
pub struct TestSetup {
    pub server: StubServer,
    pub gateway: ApiGateway,
}

impl TestSetup {
    /// Gateway with an in-memory session over a stub with `catalogue_size` artworks
    pub async fn new(catalogue_size: u64) -> Self {
        Self::with_storage(catalogue_size, Arc::new(MemoryStore::new())).await
    }

    /// Gateway whose session persists into `storage`
    pub async fn with_storage(catalogue_size: u64, storage: Arc<dyn KeyValueStore>) -> Self {
        setup_test_env();

        let server = StubServer::start(catalogue_size).await;
        let session = Arc::new(SessionStore::initialize(storage));
        let gateway = ApiGateway::new(server.base_url(), session);

        Self { server, gateway }
    }
}
