use crate::{RpcService, error::RpcServiceEndpointError};
use qrpc::rpc::{RpcRequest, RpcResponse};
use std::collections::{HashMap, hash_map::Entry};

pub const NO_SERVICE_FOUND: &str = "no service found";
pub const NO_SERVICE_METHOD_FOUND: &str = "no service method found";

/// Registration table mapping service names to their methods.
///
/// Populated before the server starts and only read afterwards, so it is
/// shared across connection tasks without a lock.
#[derive(Clone, Default)]
pub struct RpcServiceEndpoint {
    services: HashMap<String, RpcService>,
}

impl RpcServiceEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        service_name: impl Into<String>,
        service: RpcService,
    ) -> Result<(), RpcServiceEndpointError> {
        match self.services.entry(service_name.into()) {
            Entry::Occupied(entry) => Err(RpcServiceEndpointError::DuplicateService(
                entry.key().clone(),
            )),
            Entry::Vacant(entry) => {
                entry.insert(service);
                Ok(())
            }
        }
    }

    pub fn service(&self, service_name: &str) -> Option<&RpcService> {
        self.services.get(service_name)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Runs the method named by `request` and wraps its outcome in a
    /// response carrying the same request id.
    ///
    /// Every failure becomes an error response; this never returns an `Err`.
    /// Codec fields are left at their defaults for the caller to fill in.
    pub async fn dispatch(&self, request: RpcRequest) -> RpcResponse {
        let RpcRequest {
            request_id,
            service_name,
            method_name,
            args,
        } = request;

        let Some(service) = self.services.get(&service_name) else {
            tracing::warn!("Request {}: unknown service `{}`", request_id, service_name);
            return RpcResponse::error(request_id, NO_SERVICE_FOUND);
        };

        let Some(handler) = service.method(&method_name) else {
            tracing::warn!(
                "Request {}: unknown method `{}.{}`",
                request_id,
                service_name,
                method_name
            );
            return RpcResponse::error(request_id, NO_SERVICE_METHOD_FOUND);
        };

        match handler(args).await {
            Ok(data) => RpcResponse::success(request_id, data),
            Err(err) => {
                tracing::debug!(
                    "Request {}: `{}.{}` failed: {}",
                    request_id,
                    service_name,
                    method_name,
                    err
                );
                RpcResponse::error(request_id, err.to_string())
            }
        }
    }
}
