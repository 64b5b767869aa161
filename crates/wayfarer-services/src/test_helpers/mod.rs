//! Test helpers: in-memory store implementations and recording mocks
//!
//! These allow exercising the lifecycle services without a database or an
//! object store.

pub mod fixtures;
pub mod mock_stores;

pub use mock_stores::{
    InMemoryBookingStore, InMemoryDependantStore, InMemoryProfileStore, InMemoryTourStore,
    InMemoryUserDirectory, MockStorage, RecordingNotifier,
};
