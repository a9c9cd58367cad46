#[cfg(test)]
pub mod fake;
pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpBackend;
pub use traits::Backend;
pub use types::BackendError;
