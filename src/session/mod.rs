pub mod api_client;
pub mod dto;
pub mod http_session;
pub mod urls;

#[cfg(test)]
pub mod testing;

pub use api_client::{ApiClient, ApiError, HttpMethod};
pub use dto::Page;
pub use http_session::HttpSession;
pub use urls::*;
