//! Response DTOs for the JSON endpoints.

use serde::{Deserialize, Serialize};

use breakerboard_stream::StreamMetricsSnapshot;

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Basic health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
}

/// Detailed health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status, `degraded` when the store is unreachable.
    pub status: String,
    /// Counter store reachability.
    pub store: String,
    /// Configured store provider.
    pub store_provider: String,
    /// Streams currently open.
    pub active_streams: u64,
    /// Stream counters since startup.
    pub stream: StreamMetricsSnapshot,
}

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}
