use serde::{Deserialize, Serialize};

use apotek_inventory::DEFAULT_WARNING_DAYS;

/// Externally supplied tuning knobs, passed into the service rather than
/// read from globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Near-expiry window in days.
    pub expiry_warning_days: u32,
    /// Reorder threshold applied when a catalog entry does not specify one.
    pub low_stock_threshold_default: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            expiry_warning_days: DEFAULT_WARNING_DAYS,
            low_stock_threshold_default: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: InventoryConfig =
            serde_json::from_str(r#"{"expiry_warning_days": 14}"#).unwrap();
        assert_eq!(config.expiry_warning_days, 14);
        assert_eq!(config.low_stock_threshold_default, 10);
    }
}
