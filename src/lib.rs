// Core layer - configuration and shared error types
pub mod core;

// Chat server layer - REST client, event envelope and wire models
pub mod api;

// Features layer - session, ingest, pipeline, terms and notifications
pub mod features;

pub use api::{ChatApi, ChatEvent, MattermostClient};
pub use core::{ApiError, Config};

pub use features::{
    // Ingest
    ingest::{EventIngest, EVENT_CHANNEL_CAPACITY},
    // Notifications
    notifier::Notifier,
    // Pipeline
    pipeline::{Outcome, Pipeline},
    // Session
    session::{bootstrap, BootstrapError, Session},
    // Terms
    terms::{check_message, TermDictionary, TermMatch},
};
