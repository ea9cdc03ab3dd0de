//! Route registry.
//!
//! Maps operations to queue addresses and reply timeouts. The routing table is an
//! immutable [`RoutesConfig`] snapshot behind [`ArcSwap`]: readers load the current
//! snapshot without locking, and [`RouteRegistry::reconfigure`] replaces it as a whole.

use std::sync::Arc;

use arc_swap::ArcSwap;
use filegate_core::{Operation, RoutesConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub operation: Operation,
    pub address: String,
    pub timeout_ms: u64,
}

#[derive(Clone)]
pub struct RouteRegistry {
    routes: Arc<ArcSwap<RoutesConfig>>,
}

impl RouteRegistry {
    pub fn new(routes: RoutesConfig) -> Self {
        Self {
            routes: Arc::new(ArcSwap::from_pointee(routes)),
        }
    }

    pub fn resolve(&self, operation: Operation) -> RouteDescriptor {
        let routes = self.routes.load();
        RouteDescriptor {
            operation,
            address: routes.address(operation),
            timeout_ms: routes.timeout_ms(operation),
        }
    }

    /// Current routing snapshot.
    pub fn snapshot(&self) -> Arc<RoutesConfig> {
        self.routes.load_full()
    }

    /// Validate and atomically install a new routing table. In-flight calls keep the
    /// descriptor they already resolved.
    pub fn reconfigure(&self, routes: RoutesConfig) -> Result<(), anyhow::Error> {
        routes.validate()?;
        self.routes.store(Arc::new(routes));
        tracing::info!("Route table reconfigured");
        Ok(())
    }
}

impl std::fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("routes", &self.routes.load())
            .finish()
    }
}
