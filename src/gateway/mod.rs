//! Remote Data Gateways
//!
//! A gateway is the read-only source a slice polls. Each call returns either a
//! full replacement collection or an error; there is no paging and no
//! incremental update.
//!
//! - **Gateway**: the trait slices depend on
//! - **HttpGateway**: GETs a JSON array from a configured URL
//! - **GatewayError**: what can go wrong on the way

mod error;
mod http;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{GatewayError, GatewayResult};
pub use http::{HttpGateway, HttpGatewayConfig};

use async_trait::async_trait;

/// Source of a slice's records
#[async_trait]
pub trait Gateway<T>: Send + Sync {
    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Fetch the complete current collection
    async fn fetch(&self) -> GatewayResult<Vec<T>>;
}
