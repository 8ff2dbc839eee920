//! Realtime push - the topic-scoped event emitter

mod hub;

pub use hub::RealtimeHub;
