//! Known `--query-gpu` fields and how their values are published
//!
//! Fields not listed here are queried as-is: no conversion, `gauge` type.

use super::converter::Converter;
use nvsmi_types::{FieldMetadata, MetricType};
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::converter::Converter::{Active, Enabled, HexToDecimal, PState};
use nvsmi_types::MetricType::{Gauge, Percent, Temperature};

/// Catalog entry for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: &'static str,
    pub converter: Option<Converter>,
    pub metric_type: MetricType,
}

const fn entry(
    name: &'static str,
    converter: Option<Converter>,
    metric_type: MetricType,
) -> FieldEntry {
    FieldEntry {
        name,
        converter,
        metric_type,
    }
}

const ENTRIES: &[FieldEntry] = &[
    entry("pci.bus", Some(HexToDecimal), Gauge),
    entry("pci.device", Some(HexToDecimal), Gauge),
    entry("pci.device_id", Some(HexToDecimal), Gauge),
    entry("pci.domain", Some(HexToDecimal), Gauge),
    entry("pci.sub_device_id", Some(HexToDecimal), Gauge),
    entry("clocks_throttle_reasons.supported", Some(HexToDecimal), Gauge),
    entry("clocks_throttle_reasons.active", Some(HexToDecimal), Gauge),
    entry("clocks_throttle_reasons.gpu_idle", Some(Active), Gauge),
    entry("clocks_throttle_reasons.applications_clocks_setting", Some(Active), Gauge),
    entry("clocks_throttle_reasons.sw_power_cap", Some(Active), Gauge),
    entry("clocks_throttle_reasons.hw_slowdown", Some(Active), Gauge),
    entry("clocks_throttle_reasons.hw_thermal_slowdown", Some(Active), Gauge),
    entry("clocks_throttle_reasons.hw_power_brake_slowdown", Some(Active), Gauge),
    entry("clocks_throttle_reasons.sw_thermal_slowdown", Some(Active), Gauge),
    entry("clocks_throttle_reasons.sync_boost", Some(Active), Gauge),
    entry("accounting.mode", Some(Enabled), Gauge),
    entry("display_active", Some(Enabled), Gauge),
    entry("display_mode", Some(Enabled), Gauge),
    entry("persistence_mode", Some(Enabled), Gauge),
    entry("power.management", Some(Enabled), Gauge),
    entry("pstate", Some(PState), Gauge),
    entry("fan.speed", None, Percent),
    entry("utilization.gpu", None, Percent),
    entry("utilization.memory", None, Percent),
    entry("temperature.gpu", None, Temperature),
    entry("temperature.memory", None, Temperature),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static FieldEntry>> =
    Lazy::new(|| ENTRIES.iter().map(|e| (e.name, e)).collect());

/// Look up a catalog entry
pub fn lookup(field: &str) -> Option<&'static FieldEntry> {
    BY_NAME.get(field).copied()
}

/// Converter applied to values of `field`, if any
pub fn converter_for(field: &str) -> Option<Converter> {
    lookup(field).and_then(|e| e.converter)
}

/// Metric type `field` is published as
pub fn metric_type_for(field: &str) -> MetricType {
    lookup(field).map(|e| e.metric_type).unwrap_or_default()
}

/// Every catalog entry, in catalog order
pub fn entries() -> &'static [FieldEntry] {
    ENTRIES
}

/// Catalog as field metadata, for listings
pub fn fields() -> Vec<FieldMetadata> {
    ENTRIES
        .iter()
        .map(|e| FieldMetadata::new(e.name, e.converter.map(|c| c.name()), e.metric_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pci_fields_are_hex() {
        for field in [
            "pci.bus",
            "pci.device",
            "pci.device_id",
            "pci.domain",
            "pci.sub_device_id",
        ] {
            assert_eq!(converter_for(field), Some(Converter::HexToDecimal), "{field}");
            assert_eq!(metric_type_for(field), MetricType::Gauge);
        }
    }

    #[test]
    fn test_throttle_reasons_mix_hex_and_active() {
        assert_eq!(
            converter_for("clocks_throttle_reasons.active"),
            Some(Converter::HexToDecimal)
        );
        assert_eq!(
            converter_for("clocks_throttle_reasons.hw_slowdown"),
            Some(Converter::Active)
        );
        assert_eq!(
            converter_for("clocks_throttle_reasons.sync_boost"),
            Some(Converter::Active)
        );
    }

    #[test]
    fn test_flag_and_state_fields() {
        assert_eq!(converter_for("persistence_mode"), Some(Converter::Enabled));
        assert_eq!(converter_for("power.management"), Some(Converter::Enabled));
        assert_eq!(converter_for("pstate"), Some(Converter::PState));
    }

    #[test]
    fn test_metric_types() {
        assert_eq!(metric_type_for("fan.speed"), MetricType::Percent);
        assert_eq!(metric_type_for("utilization.memory"), MetricType::Percent);
        assert_eq!(metric_type_for("temperature.gpu"), MetricType::Temperature);
        assert_eq!(converter_for("temperature.gpu"), None);
    }

    #[test]
    fn test_unknown_field_defaults() {
        assert_eq!(converter_for("power.draw"), None);
        assert_eq!(metric_type_for("power.draw"), MetricType::Gauge);
        assert!(lookup("power.draw").is_none());
    }

    #[test]
    fn test_catalog_has_no_duplicates() {
        assert_eq!(BY_NAME.len(), entries().len());
        assert_eq!(fields().len(), entries().len());
    }
}
