//! # Bus Gateway Test Suite
//!
//! End-to-end tests that start a real gateway on an ephemeral port and
//! talk to it over WebSocket.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # TestGateway + WsClient fixtures
//! └── integration/
//!     ├── rpc_flows.rs      # request/response over the wire
//!     ├── notifications.rs  # subscriptions and bus_event delivery
//!     └── lifecycle.rs      # disconnect cleanup, health, shutdown
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gateway-tests
//! cargo test -p gateway-tests integration::notifications::
//! ```

pub mod harness;
pub mod integration;
