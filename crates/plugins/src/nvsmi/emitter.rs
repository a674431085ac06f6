//! Publish a Reading as one sample per (device, field)

use super::error::{NvsmiError, Result};
use super::query::Reading;
use super::resolver::ResolvedConfig;
use nvsmi_core::Dispatcher;
use nvsmi_types::Sample;

/// Plugin name published with every sample
pub const PLUGIN_NAME: &str = "nvsmi";

/// Dispatch every value of `reading`, returning how many samples were sent
///
/// Within a device samples follow the configured field order; devices come
/// in map order.
pub fn emit(
    reading: &Reading,
    config: &ResolvedConfig,
    dispatcher: &dyn Dispatcher,
) -> Result<usize> {
    let mut dispatched = 0;

    for (device_id, values) in reading.iter() {
        for (field, value) in config.fields().iter().zip(values) {
            let sample = Sample::new(
                PLUGIN_NAME,
                device_id.as_str(),
                field.metric_type,
                field.name.as_str(),
                value.as_str(),
            );
            dispatcher
                .dispatch(sample)
                .map_err(|e| NvsmiError::Dispatch(format!("{:#}", e)))?;
            dispatched += 1;
        }
    }

    Ok(dispatched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nvsmi::query::parse_output;
    use crate::nvsmi::resolver::IdentitySpec;
    use nvsmi_core::RecordingDispatcher;
    use nvsmi_types::MetricType;

    fn config(fields: &[&str]) -> ResolvedConfig {
        ResolvedConfig::resolve("nvidia-smi", fields.to_vec(), IdentitySpec::default()).0
    }

    #[test]
    fn test_one_sample_per_device_and_field() {
        let config = config(&["utilization.gpu", "temperature.gpu", "pstate"]);
        let reading = parse_output(
            "0x00, 45, 60, P0\n0x01, 50, 70, P2\n",
            config.identity(),
            config.fields(),
        )
        .unwrap();
        let recorder = RecordingDispatcher::new();

        let count = emit(&reading, &config, &recorder).unwrap();
        assert_eq!(count, 6);

        let samples = recorder.take();
        assert_eq!(samples.len(), 6);
        assert!(samples.iter().all(|s| s.plugin == PLUGIN_NAME));
        assert!(samples.iter().all(|s| s.values.len() == 1));

        let device_1: Vec<&Sample> = samples.iter().filter(|s| s.plugin_instance == "1").collect();
        assert_eq!(
            device_1
                .iter()
                .map(|s| (s.type_instance.as_str(), s.metric_type, s.values[0].as_str()))
                .collect::<Vec<_>>(),
            vec![
                ("utilization.gpu", MetricType::Percent, "50"),
                ("temperature.gpu", MetricType::Temperature, "70"),
                ("pstate", MetricType::Gauge, "2"),
            ]
        );
    }

    #[test]
    fn test_empty_reading_emits_nothing() {
        let config = config(&["utilization.gpu"]);
        let recorder = RecordingDispatcher::new();

        let count = emit(&Reading::default(), &config, &recorder).unwrap();
        assert_eq!(count, 0);
        assert!(recorder.is_empty());
    }

    struct FailingDispatcher;

    impl Dispatcher for FailingDispatcher {
        fn dispatch(&self, _sample: Sample) -> anyhow::Result<()> {
            anyhow::bail!("host went away")
        }
    }

    #[test]
    fn test_dispatch_failure_is_reported() {
        let config = config(&["utilization.gpu"]);
        let reading = parse_output("0, 45\n", config.identity(), config.fields()).unwrap();

        let err = emit(&reading, &config, &FailingDispatcher).unwrap_err();
        assert!(matches!(err, NvsmiError::Dispatch(msg) if msg.contains("host went away")));
    }
}
