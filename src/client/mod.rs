pub mod api;
pub mod http;
pub mod request;

pub use api::SessionApi;
pub use http::HttpSessionClient;
pub use request::CreateSessionRequest;
