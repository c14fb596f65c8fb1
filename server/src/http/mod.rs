mod dto;
mod error;
mod handlers;
mod server;
mod state;


pub use dto::{ErrorResponse, PutConfigRequest};
pub use error::{ApiError, ApiResult};
pub use server::{HttpServer, router};
pub use state::AppState;
