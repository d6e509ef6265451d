//! End-to-end scenarios for the sampling pipeline.
//!
//! Each test drives a [`SamplingEngine`] through scripted transport reads and
//! checks what reached the sink. Ranges are set so one count is one physical
//! unit unless a test says otherwise.

// Allow test-specific patterns
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::float_cmp)]

use approx::assert_relative_eq;
use glam::DVec3;
use imu_sampler::prelude::*;
use imu_sampler::{ManualClock, RecordingSink, ScriptedTransport};
use imu_types::{
    Axis, BiasTable, DeviceType, Duration, FULL_SCALE_COUNTS, FrameId, ImuError, RangeTable,
    SampleArray, SensorGroup, Timestamp, VarianceTable,
};

type Engine = SamplingEngine<ScriptedTransport, RecordingSink, ManualClock>;

fn unit_config() -> SamplerConfig {
    SamplerConfig {
        ranges: RangeTable::new(FULL_SCALE_COUNTS, FULL_SCALE_COUNTS, FULL_SCALE_COUNTS).unwrap(),
        ..SamplerConfig::default()
    }
}

fn gyro_x(x: f64) -> SampleArray {
    SampleArray::new(
        Timestamp::zero(),
        DVec3::new(x, 0.0, 0.0),
        DVec3::ZERO,
        DVec3::ZERO,
    )
}

fn build(transport: ScriptedTransport, config: &SamplerConfig) -> (Engine, RecordingSink, ManualClock) {
    let sink = RecordingSink::new();
    let clock = ManualClock::new(Timestamp::from_secs_f64(1_000.0));
    let engine = SamplingEngine::from_config(transport, sink.clone(), clock.clone(), config).unwrap();
    (engine, sink, clock)
}

// =============================================================================
// Calibration
// =============================================================================

mod calibration {
    use super::*;

    #[test]
    fn bias_is_subtracted_after_scaling() {
        let config = SamplerConfig {
            biases: BiasTable::default().with_axis(SensorGroup::Gyro, Axis::X, 1.0),
            ..unit_config()
        };
        let (engine, sink, _) = build(ScriptedTransport::from_samples([gyro_x(5.0)]), &config);

        let sample = engine.poll().unwrap();
        assert_relative_eq!(sample.raw.gyro().x, 5.0);
        assert_relative_eq!(sample.calibrated.gyro().x, 4.0);
        assert_relative_eq!(sample.calibrated.gyro().y, 0.0);

        let (raw, calibrated) = sink.snapshot().instant.remove(0);
        assert_relative_eq!(raw.angular_velocity.x, 5.0);
        assert_relative_eq!(calibrated.angular_velocity.x, 4.0);
    }

    #[test]
    fn default_ranges_scale_device_counts() {
        let counts = SampleArray::new(
            Timestamp::zero(),
            DVec3::splat(FULL_SCALE_COUNTS),
            DVec3::splat(FULL_SCALE_COUNTS / 2.0),
            DVec3::splat(-FULL_SCALE_COUNTS),
        );
        let (engine, _, _) = build(ScriptedTransport::from_samples([counts]), &SamplerConfig::default());

        let sample = engine.poll().unwrap();
        assert_relative_eq!(sample.raw.gyro().x, 150.0, epsilon = 1e-9);
        assert_relative_eq!(sample.raw.accel().y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(sample.raw.mag().z, -1.9, epsilon = 1e-9);
    }

    #[test]
    fn variance_rides_along_unchanged() {
        let config = SamplerConfig {
            variances: VarianceTable::new(
                DVec3::new(0.1, 0.2, 0.3),
                DVec3::new(0.4, 0.5, 0.6),
                DVec3::new(0.7, 0.8, 0.9),
            )
            .unwrap(),
            ..unit_config()
        };
        let (engine, sink, _) = build(ScriptedTransport::from_samples([gyro_x(3.0)]), &config);
        engine.poll().unwrap();

        let recording = sink.snapshot();
        let (_, imu) = &recording.instant[0];
        assert_eq!(imu.angular_velocity.x, 3.0);
        assert_eq!(
            imu.angular_velocity_covariance,
            [0.1, 0.0, 0.0, 0.0, 0.2, 0.0, 0.0, 0.0, 0.3]
        );
        assert_eq!(imu.linear_acceleration_covariance[8], 0.6);

        let (_, mag) = &recording.mag_instant[0];
        assert_eq!(mag.magnetic_field_covariance[4], 0.8);
    }

    #[test]
    fn calibration_swap_applies_to_next_poll_only() {
        let (engine, _, _) = build(
            ScriptedTransport::from_samples([gyro_x(10.0), gyro_x(10.0), gyro_x(10.0)]),
            &unit_config(),
        );

        engine.poll().unwrap();
        engine.poll().unwrap();
        engine
            .update_calibration(
                BiasTable::default().with_axis(SensorGroup::Gyro, Axis::X, 3.0),
                VarianceTable::default(),
            )
            .unwrap();
        let third = engine.poll().unwrap();
        assert_relative_eq!(third.calibrated.gyro().x, 7.0);

        // (10 + 10 + 7) / 3; earlier samples keep their original correction.
        let out = engine.output_filter().unwrap().unwrap();
        assert_relative_eq!(out.calibrated.gyro().x, 9.0);
    }
}

// =============================================================================
// Windowed filtering
// =============================================================================

mod filtering {
    use super::*;

    #[test]
    fn mean_of_three_then_empty() {
        let (engine, sink, _) = build(
            ScriptedTransport::from_samples([gyro_x(2.0), gyro_x(4.0), gyro_x(6.0)]),
            &unit_config(),
        );
        for _ in 0..3 {
            engine.poll().unwrap();
        }

        let out = engine.output_filter().unwrap().unwrap();
        assert_relative_eq!(out.calibrated.gyro().x, 4.0);
        assert_eq!(out.count, 3);

        // Flushing again without new samples yields nothing.
        assert!(engine.output_filter().unwrap().is_none());
        assert_eq!(sink.snapshot().filtered.len(), 1);
    }

    #[test]
    fn failed_read_shortens_window() {
        let mut transport = ScriptedTransport::new();
        transport.push_sample(gyro_x(1.0));
        transport.push_sample(gyro_x(2.0));
        transport.push_failure("checksum mismatch");
        transport.push_sample(gyro_x(4.0));
        transport.push_sample(gyro_x(5.0));
        let (engine, sink, _) = build(transport, &unit_config());

        let mut failures = 0;
        for _ in 0..5 {
            match engine.poll() {
                Ok(_) => {}
                Err(SamplerError::TransportRead(_)) => failures += 1,
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
        assert_eq!(failures, 1);
        assert_eq!(sink.snapshot().instant.len(), 4);

        let out = engine.output_filter().unwrap().unwrap();
        assert_eq!(out.count, 4);
        assert_relative_eq!(out.calibrated.gyro().x, 3.0);
    }

    #[test]
    fn filtered_output_is_stamped_at_flush() {
        let (engine, sink, clock) = build(
            ScriptedTransport::from_samples([gyro_x(1.0), gyro_x(3.0)]),
            &unit_config(),
        );
        let first = clock.now();
        engine.poll().unwrap();
        clock.advance(Duration::from_millis(7));
        engine.poll().unwrap();
        clock.advance(Duration::from_millis(500));

        let out = engine.output_filter().unwrap().unwrap();
        assert_eq!(out.span.start, first);
        assert_eq!(out.span.duration(), Duration::from_millis(7));

        let (raw, calibrated) = sink.snapshot().filtered.remove(0);
        assert_eq!(calibrated.header.stamp, clock.now());
        assert_eq!(raw.header.stamp, clock.now());
    }

    #[test]
    fn filtered_raw_follows_policy() {
        let bias = BiasTable::default().with_axis(SensorGroup::Gyro, Axis::X, 0.5);
        for (source, expected_raw) in [
            (FilteredRawSource::RawMean, 2.0),
            (FilteredRawSource::CalibratedMean, 2.0),
        ] {
            let config = SamplerConfig {
                biases: bias,
                filtered_raw: source,
                ..unit_config()
            };
            let (engine, sink, _) = build(
                ScriptedTransport::from_samples([gyro_x(1.0), gyro_x(3.0)]),
                &config,
            );
            engine.poll().unwrap();
            engine.poll().unwrap();

            let out = engine.output_filter().unwrap().unwrap();
            assert_relative_eq!(out.raw.gyro().x, expected_raw);
            assert_relative_eq!(out.calibrated.gyro().x, 1.5);

            let recording = sink.snapshot();
            let (raw, calibrated) = &recording.filtered[0];
            assert_relative_eq!(raw.angular_velocity.x, expected_raw);
            assert_relative_eq!(calibrated.angular_velocity.x, 1.5);
            assert_eq!(recording.mag_filtered.len(), 1);
        }
    }

    #[test]
    fn zero_filter_rate_disables_filtered_streams() {
        let config = SamplerConfig {
            filter_rate: 0.0,
            ..unit_config()
        };
        let (engine, sink, _) = build(ScriptedTransport::from_samples([gyro_x(1.0)]), &config);

        engine.poll().unwrap();
        assert!(engine.output_filter().unwrap().is_none());

        let recording = sink.snapshot();
        assert_eq!(recording.instant.len(), 1);
        assert!(recording.filtered.is_empty());
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod configuration {
    use super::*;

    #[test]
    fn unknown_device_type_is_rejected() {
        let (engine, _, _) = build(ScriptedTransport::new(), &unit_config());

        let err = engine.set_device_type("unknown_model").unwrap_err();
        assert!(matches!(
            err,
            SamplerError::Imu(ImuError::UnknownDeviceType(ref name)) if name == "unknown_model"
        ));
        assert_eq!(engine.device_type().unwrap(), DeviceType::NImu3Temp);
    }

    #[test]
    fn negative_range_is_rejected() {
        let (engine, _, _) = build(ScriptedTransport::new(), &unit_config());
        let before = engine.ranges().unwrap();

        let err = engine.set_range(SensorGroup::Accel, -1.0).unwrap_err();
        assert!(matches!(err, SamplerError::Imu(ImuError::InvalidParameter { .. })));
        assert_eq!(engine.ranges().unwrap(), before);
    }

    #[test]
    fn range_change_affects_subsequent_polls() {
        let (engine, _, _) = build(
            ScriptedTransport::from_samples([gyro_x(16_384.0), gyro_x(16_384.0)]),
            &SamplerConfig::default(),
        );
        let before = engine.poll().unwrap();
        engine.set_range(SensorGroup::Gyro, 300.0).unwrap();
        let after = engine.poll().unwrap();

        assert_relative_eq!(before.raw.gyro().x, 75.0, epsilon = 1e-9);
        assert_relative_eq!(after.raw.gyro().x, 150.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_document_applies_nothing() {
        let (engine, _, _) = build(ScriptedTransport::new(), &unit_config());
        let before = engine.current_config().unwrap();

        let config = SamplerConfig::from_json_str(
            r#"{ "frame_id": "elsewhere", "ranges": { "accel": -1.0 } }"#,
        )
        .unwrap();
        assert!(engine.configure(&config).is_err());
        assert_eq!(engine.current_config().unwrap(), before);
    }

    #[test]
    fn reconfiguration_forwards_changes_only() {
        let (engine, sink, _) = build(ScriptedTransport::from_samples([gyro_x(1.0)]), &unit_config());

        let mut config = engine.current_config().unwrap();
        config.frame_id = FrameId::new("imu_link");
        config.polling_rate = 200.0;
        let diff = engine.configure(&config).unwrap();
        assert_eq!(diff.changed(), vec!["rates", "frame_id"]);

        engine.poll().unwrap();
        let recording = sink.snapshot();
        assert_eq!(recording.instant[0].1.header.frame_id.as_str(), "imu_link");
        assert_eq!(engine.poll_period().unwrap(), Duration::from_millis(5));
    }

    #[test]
    fn config_document_round_trips_through_engine() {
        let json = r#"{
            "device_type": "IMU_1temp",
            "ranges": { "gyro": 300.0, "accel": 4.0 },
            "biases": { "accel": [0.0, 0.0, 0.02] },
            "variances": { "mag": [0.001, 0.001, 0.002] },
            "polling_rate": 100.0,
            "filter_rate": 2.0,
            "frame_id": "base_imu"
        }"#;
        let config = SamplerConfig::from_json_str(json).unwrap();
        let (engine, _, _) = build(ScriptedTransport::new(), &config);

        assert_eq!(engine.device_type().unwrap(), DeviceType::Imu1Temp);
        assert_eq!(engine.current_config().unwrap(), config);
        assert_eq!(engine.filter_period().unwrap(), Some(Duration::from_millis(500)));
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn nothing_is_processed_before_ready() {
        let sink = RecordingSink::new();
        let engine = SamplingEngine::with_clock(
            ScriptedTransport::from_samples([gyro_x(1.0)]),
            sink.clone(),
            ManualClock::default(),
        );

        assert_eq!(engine.state().unwrap(), EngineState::Uninitialized);
        assert!(matches!(engine.poll(), Err(SamplerError::NotReady { .. })));
        assert!(sink.snapshot().instant.is_empty());
        assert_eq!(engine.with_transport(|t| t.remaining()).unwrap(), 1);
    }

    #[test]
    fn failed_setter_does_not_count_towards_ready() {
        let engine = SamplingEngine::with_clock(
            ScriptedTransport::new(),
            RecordingSink::new(),
            ManualClock::default(),
        );
        engine.set_ranges(RangeTable::default()).unwrap();
        engine
            .update_calibration(BiasTable::default(), VarianceTable::default())
            .unwrap();
        assert!(engine.set_device_type("bogus").is_err());
        assert_eq!(engine.state().unwrap(), EngineState::Uninitialized);

        engine.set_device_type("nIMU_1temp").unwrap();
        assert_eq!(engine.state().unwrap(), EngineState::Ready);
    }

    #[test]
    fn unready_transport_skips_tick() {
        let (engine, sink, _) = build(ScriptedTransport::from_samples([gyro_x(1.0)]), &unit_config());
        engine.with_transport(|t| t.set_ready(false)).unwrap();

        let err = engine.poll().unwrap_err();
        assert!(err.is_recoverable());
        assert!(sink.snapshot().instant.is_empty());

        engine.with_transport(|t| t.set_ready(true)).unwrap();
        engine.poll().unwrap();
        assert_eq!(sink.snapshot().instant.len(), 1);
    }
}

// =============================================================================
// Concurrency
// =============================================================================

mod concurrency {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use super::*;

    const SAMPLES: u32 = 2_000;

    #[test]
    fn concurrent_flushes_partition_the_sample_stream() {
        let transport = ScriptedTransport::from_samples((0..SAMPLES).map(|i| gyro_x(f64::from(i))));
        let (engine, sink, _) = build(transport, &unit_config());
        let engine = Arc::new(engine);
        let polling = Arc::new(AtomicBool::new(true));

        let poller = {
            let engine = Arc::clone(&engine);
            let polling = Arc::clone(&polling);
            thread::spawn(move || {
                for _ in 0..SAMPLES {
                    engine.poll().unwrap();
                }
                polling.store(false, Ordering::Release);
            })
        };
        let flusher = {
            let engine = Arc::clone(&engine);
            let polling = Arc::clone(&polling);
            thread::spawn(move || {
                let mut outputs = Vec::new();
                while polling.load(Ordering::Acquire) {
                    outputs.extend(engine.output_filter().unwrap());
                    thread::yield_now();
                }
                outputs
            })
        };
        poller.join().unwrap();
        let outputs: Vec<FilteredOutput> = flusher.join().unwrap();

        let recording = sink.snapshot();
        assert_eq!(recording.instant.len(), SAMPLES as usize);
        assert_eq!(recording.filtered.len(), outputs.len());
        let flushed: u32 = outputs.iter().map(|out| out.count).sum();
        assert_eq!(flushed + engine.pending_samples().unwrap(), SAMPLES);

        // Each window is the next run of published samples.
        let published: Vec<f64> = recording
            .instant
            .iter()
            .map(|(_, calibrated)| calibrated.angular_velocity.x)
            .collect();
        let mut start = 0;
        for (out, (_, calibrated)) in outputs.iter().zip(&recording.filtered) {
            let end = start + out.count as usize;
            let expected = published[start..end].iter().sum::<f64>() / f64::from(out.count);
            assert_relative_eq!(out.calibrated.gyro().x, expected, epsilon = 1e-9);
            assert_relative_eq!(calibrated.angular_velocity.x, expected, epsilon = 1e-9);
            start = end;
        }
    }
}
