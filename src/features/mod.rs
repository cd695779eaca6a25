pub mod ingest;
pub mod notifier;
pub mod pipeline;
pub mod session;
pub mod terms;
