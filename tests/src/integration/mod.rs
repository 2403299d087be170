//! Cross-component flows: client ⇄ gateway ⇄ bus.

mod lifecycle;
mod notifications;
mod rpc_flows;
