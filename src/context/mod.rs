//! Per-request contexts handed to body producers

mod handler;
mod response;

pub use handler::HandlerContext;
pub use response::{RequestHead, ResponseContext};
