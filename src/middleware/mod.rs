mod error_handler;
mod rate_limit;
mod security_headers;

pub use error_handler::log_errors;
pub use rate_limit::{
    RateLimitHeaders, UNKNOWN_CLIENT, apply_rate_limit_headers, client_identifier, enforce_rate_limit,
};
pub use security_headers::security_headers;
