use serde::{Deserialize, Serialize};

/// Resource accounting domain events - one per counter operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceEvent {
    /// An acquire attempt finished; `admitted` carries the outcome
    Acquired { admitted: bool },

    /// A previously acquired slot was released
    Released,
}
