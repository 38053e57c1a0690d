pub mod ambient_pipeline;
pub mod logger;
