//! The cart store: a service task that owns the cart and a client handle to reach it.

mod client;
mod service;

pub use client::CartClient;
pub use service::{CartOptions, CartService, CorruptCartPolicy, DEFAULT_STORAGE_KEY};
