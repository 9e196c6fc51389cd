//! In-memory registration registry and the routing front door

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::activation::{Clock, SystemClock};
use crate::domain::conflict::{ConflictDetector, ConflictError};
use crate::domain::error::RouterError;
use crate::domain::registration::{Registration, ServiceTypeId};
use crate::domain::routing::{InvocationRouter, RouteRequest};

/// In-memory store of frozen registrations, keyed by service type.
///
/// `register` validates the new registration against the whole existing set
/// through the conflict detector, so a conflicting registration never
/// becomes servable.
#[derive(Debug, Default)]
pub struct InMemoryRegistrationRegistry {
    registrations: RwLock<HashMap<ServiceTypeId, Vec<Arc<Registration>>>>,
}

impl InMemoryRegistrationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registration, rejecting it on any conflict with the existing
    /// set
    pub fn register(&self, registration: Registration) -> Result<Arc<Registration>, ConflictError> {
        let mut map = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut all: Vec<Registration> = map
            .values()
            .flatten()
            .map(|existing| (**existing).clone())
            .collect();
        all.push(registration.clone());

        ConflictDetector::validate_or_throw(&all)?;

        let registration = Arc::new(registration);
        map.entry(registration.service_type().clone())
            .or_default()
            .push(registration.clone());

        Ok(registration)
    }

    /// Find the registration for a service type whose time window contains
    /// `now`
    pub fn active_for(
        &self,
        service_type: &ServiceTypeId,
        now: DateTime<Utc>,
    ) -> Option<Arc<Registration>> {
        let map = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        map.get(service_type)?
            .iter()
            .find(|registration| registration.is_within_window(now))
            .cloned()
    }

    /// Get every stored registration
    pub fn all(&self) -> Vec<Arc<Registration>> {
        let map = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        map.values().flatten().cloned().collect()
    }
}

/// Front door combining the registry with the invocation router:
/// `invoke(service_type, request)` looks up the live registration and
/// routes through it.
#[derive(Debug)]
pub struct RoutingService {
    registry: Arc<InMemoryRegistrationRegistry>,
    router: Arc<InvocationRouter>,
    clock: Arc<dyn Clock>,
}

impl RoutingService {
    /// Create a routing service over a registry and router
    pub fn new(registry: Arc<InMemoryRegistrationRegistry>, router: Arc<InvocationRouter>) -> Self {
        Self {
            registry,
            router,
            clock: Arc::new(SystemClock),
        }
    }

    /// Override the time source used for registration lookup
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Route a call for a service type
    pub async fn invoke(
        &self,
        service_type: &ServiceTypeId,
        request: RouteRequest,
    ) -> Result<Value, RouterError> {
        let registration = self
            .registry
            .active_for(service_type, self.clock.now())
            .ok_or_else(|| RouterError::UnknownServiceType {
                service_type: service_type.clone(),
            })?;

        self.router.invoke(&registration, request).await
    }
}
