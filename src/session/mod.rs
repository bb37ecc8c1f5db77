//! Session lifecycle: persisted storage, the in-memory store and the
//! authenticator that fills it.

pub mod authenticator;
pub mod storage;
pub mod store;
