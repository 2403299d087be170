//! Bus startup: open the in-process bus and write the configured seed.

use anyhow::{Context, Result};
use bus_client::InMemoryBus;
use bus_gateway::codec;
use bus_gateway::domain::BusConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Open the bus under the configured component name and seed it.
pub fn open_bus(config: &BusConfig) -> Result<Arc<InMemoryBus>> {
    let bus = InMemoryBus::open(&config.component_name)
        .with_context(|| format!("bus open failed for component {:?}", config.component_name))?;

    let seeded = seed(&bus, &config.seed);
    info!(
        component = %config.component_name,
        elements = seeded,
        "Bus seeded"
    );
    Ok(Arc::new(bus))
}

/// Write every seed entry as a writable element. Entries the value codec
/// rejects are skipped with a warning. Returns the number written.
pub fn seed(bus: &InMemoryBus, seed: &serde_json::Map<String, serde_json::Value>) -> usize {
    let mut written = 0;
    for (path, raw) in seed {
        match codec::from_json(raw) {
            Ok(value) => {
                bus.insert(path.clone(), value);
                written += 1;
            }
            Err(e) => warn!(path = %path, error = %e, "Skipping seed entry"),
        }
    }
    written
}
