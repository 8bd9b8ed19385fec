// HTTP access to the alchemy backend

pub mod client;
pub mod errors;


pub use client::{BackendHttpClient, ClientSettings};
pub use errors::BackendError;
