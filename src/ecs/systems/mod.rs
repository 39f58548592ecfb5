pub mod ingest;
pub mod monitor;
