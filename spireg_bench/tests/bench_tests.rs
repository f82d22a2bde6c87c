#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use std::io::Write;
use std::sync::OnceLock;

use quickcheck::{TestResult, quickcheck};
use rstest::rstest;
use spireg_bench::*;
use spireg_core::{Frame, Register, RegisterBank, RegisterWrite};

fn init_test_logger() {
    static INIT: OnceLock<()> = OnceLock::new();
    let _ = INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn fast_bench() -> Bench {
    init_test_logger();
    Bench::new(BenchConfig::fast()).unwrap()
}

#[rstest]
#[case("tiny_tapeout_spi")]
#[case("pwm_channel_setup")]
#[case("truncated_frames")]
#[case("glitches")]
#[case("reset_clears")]
fn test_scenario_passes_with_fast_timing(#[case] name: &str) {
    let mut bench = fast_bench();
    let report = scenario(name).unwrap().run(&mut bench).unwrap();
    assert_eq!(report.name.as_deref(), Some(name));
    assert!(report.checks > 0);
}

#[test]
fn test_all_scenarios_pass_with_reference_timing() {
    init_test_logger();
    for scenario in ALL_SCENARIOS.iter() {
        let mut bench = Bench::new(BenchConfig::default()).unwrap();
        if let Err(e) = scenario.run(&mut bench) {
            panic!("scenario {} failed: {e}", scenario.name);
        }
    }
}

#[test]
fn test_reference_sequence_final_state() {
    let mut bench = fast_bench();
    let report = scenario("tiny_tapeout_spi").unwrap().run(&mut bench).unwrap();
    assert_eq!(
        report.registers,
        RegisterBank::from_values([0xF0, 0xCC, 0xFF, 0x00, 0x01])
    );
    // 0x30 and 0x41 are unmapped, so only mapped writes are recorded.
    assert_eq!(report.writes.len(), 7);
    assert!(report.writes.iter().all(|w| w.register.address() <= 4));
}

#[test]
fn test_unknown_scenario() {
    assert!(matches!(
        scenario("no_such_thing"),
        Err(BenchError::UnknownScenario(name)) if name == "no_such_thing"
    ));
}

#[test]
fn test_script_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "name": "from file",
            "steps": [
                {{ "op": "write", "address": 2, "data": 7 }},
                {{ "op": "abort", "address": 2, "data": 9, "bits": 15 }},
                {{ "op": "expect", "register": "enable_pwm_low", "value": 7 }}
            ]
        }}"#
    )
    .unwrap();

    let script = Script::load(file.path()).unwrap();
    let mut bench = fast_bench();
    let report = script.run(&mut bench).unwrap();
    assert_eq!(report.steps, 3);
    assert_eq!(report.checks, 1);
    assert_eq!(
        report.writes,
        vec![RegisterWrite {
            register: Register::EnablePwmLow,
            value: 7
        }]
    );
}

#[test]
fn test_failed_expectation_names_step() {
    let script = Script::new(
        "wrong",
        vec![
            Step::Write {
                address: 0,
                data: 1,
            },
            Step::Expect {
                register: Register::EnableOutputsLow,
                value: 2,
            },
        ],
    );
    let mut bench = fast_bench();
    match script.run(&mut bench) {
        Err(BenchError::Expectation {
            step,
            register,
            expected,
            actual,
        }) => {
            assert_eq!(step, 1);
            assert_eq!(register, Register::EnableOutputsLow);
            assert_eq!(expected, 2);
            assert_eq!(actual, 1);
        },
        other => panic!("expected failed expectation, got {other:?}"),
    }
}

#[rstest]
#[case(16)]
#[case(17)]
#[case(255)]
fn test_abort_step_must_stop_short(#[case] bits: u8) {
    let script = Script::from_json(&format!(
        r#"{{ "steps": [ {{ "op": "abort", "address": 2, "data": 119, "bits": {bits} }} ] }}"#
    ))
    .unwrap();
    let mut bench = fast_bench();
    assert!(matches!(
        script.run(&mut bench),
        Err(BenchError::PartialFrameTooLong(b)) if b == usize::from(bits)
    ));
    assert!(bench.writes().is_empty());
    assert_eq!(bench.register(Register::EnablePwmLow), 0);
}

#[test]
fn test_missing_script_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Script::load(dir.path().join("missing.json")),
        Err(BenchError::Io(_))
    ));
}

#[test]
fn test_trace_saved_as_csv() {
    init_test_logger();
    let mut bench = Bench::new(BenchConfig::fast().with_record_trace(true)).unwrap();
    bench.write(0x04, 0x80).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.csv");
    bench.trace().unwrap().save_csv(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("tick,rst_n,cs_n,copi,sclk,edges,state,event,write")
    );
    assert_eq!(lines.count() as u64, bench.ticks());
    assert!(text.contains("pwm_duty_cycle"));
}

#[test]
fn test_sweep_subset() {
    init_test_logger();
    let report = Sweep::new(BenchConfig::fast())
        .with_addresses(0..=5)
        .with_data(0x7E..=0x81)
        .run()
        .unwrap();
    assert!(report.passed());
    assert_eq!(report.frames, 24);
    assert_eq!(report.writes_checked, 20);
    assert_eq!(report.noops_checked, 4);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_sweep_matches_serial() {
    let sweep = Sweep::new(BenchConfig::fast())
        .with_addresses(0..=7)
        .with_data(0..=3);
    let serial = sweep.clone().run().unwrap();
    let parallel = sweep.with_parallel(true).run().unwrap();
    assert_eq!(serial, parallel);
}

quickcheck! {
    fn prop_any_frame_decodes_like_the_bank(address: u8, data: u8, half_period: u8) -> TestResult {
        let address = address & 0x7f;
        let half_period = u32::from(half_period % 4) + 1;
        let config = BenchConfig::fast().with_half_period(half_period);
        let mut bench = Bench::new(config).unwrap();
        let frame = Frame::new(u16::from(address), u16::from(data)).unwrap();

        let outcome = bench.send(frame);
        TestResult::from_bool(
            outcome.write == RegisterBank::decode(frame)
                && *bench.registers() == RegisterBank::reset_value().commit(frame).0
        )
    }

    fn prop_short_frames_never_write(bits: u8) -> TestResult {
        let bits = usize::from(bits % 16);
        let mut bench = Bench::new(BenchConfig::fast()).unwrap();
        let outcome = bench.send_partial(Frame::new(0x00, 0xFF).unwrap(), bits).unwrap();
        TestResult::from_bool(outcome.write.is_none() && bench.writes().is_empty())
    }
}
