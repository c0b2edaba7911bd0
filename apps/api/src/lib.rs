pub mod analysis;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod llm_client;
pub mod pipeline;
pub mod research;
pub mod routes;
pub mod search;
pub mod state;
pub mod writer;
