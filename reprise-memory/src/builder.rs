//! Builder for [`MemoryStore`].

use reprise_core::StoreLabel;

use crate::store::MemoryStore;

/// Builder for creating and configuring a [`MemoryStore`].
///
/// ```
/// use reprise_memory::MemoryStore;
///
/// let store = MemoryStore::builder()
///     .label("sessions")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStoreBuilder {
    label: StoreLabel,
}

impl Default for MemoryStoreBuilder {
    fn default() -> Self {
        Self {
            label: StoreLabel::new_static("memory"),
        }
    }
}

impl MemoryStoreBuilder {
    /// Sets the label reported in tracing fields and metrics.
    pub fn label(mut self, label: impl Into<StoreLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Builds an empty store.
    pub fn build(self) -> MemoryStore {
        MemoryStore::from_parts(self.label)
    }
}
