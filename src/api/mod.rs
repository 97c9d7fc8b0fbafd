/// Backend contract: request/response types and the HTTP client.
///
/// Architecture:
/// ```text
///   AppState::dispatch
///        │  Command { ticket, Request }
///        ▼
///   ┌──────────────┐
///   │ RequestWorker │  one thread per request
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐        POST /data/...
///   │ Backend   │ ───────────────────────▶  analysis service
///   └──────────┘ ◀───────────────────────   JSON / error body
///        │
///        ▼
///   Completion { ticket, Event } → AppState::complete
/// ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiClient, Backend};
pub use error::ApiError;
