//! # Robochat Testkit
//!
//! Testing utilities for Robochat.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a throwaway on-disk store
//! - **Generators**: Proptest strategies for identifiers and records
//! - **Tracing**: a test-friendly subscriber honoring `RUST_LOG`
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use robochat_testkit::fixtures::TestStore;
//! use robochat_store::ChatStore;
//!
//! async fn example() {
//!     let fixture = TestStore::new();
//!     fixture.store.add_room(1.into(), "Room_1").await.unwrap();
//!
//!     // Same file, fresh handle.
//!     let reopened = fixture.reopen();
//!     assert_eq!(reopened.load_rooms().await.unwrap().len(), 1);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use robochat_core::{Message, Record};
//! use robochat_testkit::generators::message;
//!
//! proptest! {
//!     #[test]
//!     fn message_round_trips(msg in message()) {
//!         prop_assert_eq!(Message::decode(&msg.encode().unwrap()).unwrap(), msg);
//!     }
//! }
//! ```

use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub mod fixtures;
pub mod generators;

pub use fixtures::TestStore;

static TRACING: Once = Once::new();

/// Install a fmt subscriber writing through the test harness.
///
/// Filter comes from `RUST_LOG`, defaulting to `warn`. Safe to call from
/// every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        // Another subscriber may already be installed by the host binary.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
