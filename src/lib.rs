pub mod combine_dataset;
pub mod combine_fetch;
pub mod comparison;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod export;
pub mod http_client;
pub mod logging;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod similarity;
pub mod state;
pub mod synthetic;
