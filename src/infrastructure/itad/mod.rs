pub mod client;

pub use client::ItadClient;
