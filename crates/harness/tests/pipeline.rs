// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! End-to-end runs of the harness pipeline against scripted and
//! descriptor-driven backends.

use backend_runtime::mock::{ScriptedBackend, Stage as Call};
use backend_runtime::{ElementType, ManifestBackend};
use harness::{
    run_harness, HarnessConfig, HarnessError, OutputReport, Palette, Session, Stage,
    MISSING_INPUTS_MESSAGE,
};
use std::path::{Path, PathBuf};

fn write(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

/// Two inputs (4 B, 8 B) and one float32 output holding `1.0`.
fn two_in_one_out() -> ScriptedBackend {
    ScriptedBackend::new()
        .with_input(4)
        .with_input(8)
        .with_output(ElementType::Float32, f32_bytes(&[1.0]))
}

fn run(backend: ScriptedBackend, config: HarnessConfig) -> (Result<harness::RunSummary, HarnessError>, String) {
    let mut out = Vec::new();
    let result = run_harness(backend, config, Palette::plain(), &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn full_run_matches_golden() {
    let dir = tempfile::tempdir().unwrap();
    let in0 = write(dir.path(), "in0.bin", &[1, 2, 3, 4]);
    let in1 = write(dir.path(), "in1.bin", &[9; 8]);
    let golden = write(dir.path(), "golden0.bin", &f32_bytes(&[1.0]));

    let backend = two_in_one_out();
    let log = backend.log();
    let config = HarnessConfig {
        model: "model".into(),
        inputs: vec![in0, in1],
        goldens: vec![golden],
        ..Default::default()
    };

    let (result, report) = run(backend, config);
    let summary = result.unwrap();

    assert_eq!(
        log.calls(),
        vec![
            Call::Initialize,
            Call::Open,
            Call::Allocate,
            Call::Execute,
            Call::OutputInfo,
            Call::Release,
            Call::Close,
            Call::Deinitialize,
        ]
    );
    assert_eq!(log.input_snapshots(), vec![vec![vec![1, 2, 3, 4], vec![9; 8]]]);

    let outcome = summary.outputs[0].outcome().unwrap();
    assert_eq!(outcome.diff_count, 0);
    assert_eq!(outcome.snr, f64::INFINITY);
    assert!(summary.all_matched());
    assert_eq!(summary.scratch.acquisitions, summary.scratch.releases);

    assert!(report.starts_with("Loaded Model:\n\tmodel(0000000000005EED)\n"));
    assert!(report.contains("Model Execution Time (1): "));
    assert!(report.contains("Avg. Model Execution Time: "));
    assert!(report.contains("Output Layer(0): Golden Match\n-\tsnr value:inf\n"));
}

#[test]
fn iterations_are_timed_individually() {
    let backend = two_in_one_out();
    let log = backend.log();
    let config = HarnessConfig {
        model: "model".into(),
        force: true,
        iterations: 3,
        ..Default::default()
    };

    let (result, report) = run(backend, config);
    let summary = result.unwrap();

    assert_eq!(log.count(Call::Execute), 3);
    assert_eq!(summary.timings.iterations(), 3);
    for idx in 1..=3 {
        assert!(report.contains(&format!("Model Execution Time ({idx}): ")));
    }
    assert!(!report.contains("Model Execution Time (4)"));
    let avg = summary.timings.average_micros().unwrap();
    assert!(report.contains(&format!("Avg. Model Execution Time: {avg} microseconds")));
}

#[test]
fn missing_input_file_count_stops_before_execute() {
    let dir = tempfile::tempdir().unwrap();
    let in0 = write(dir.path(), "in0.bin", &[1, 2, 3, 4]);

    let backend = two_in_one_out();
    let log = backend.log();
    let config = HarnessConfig {
        model: "model".into(),
        inputs: vec![in0],
        ..Default::default()
    };

    let (result, _) = run(backend, config);
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        HarnessError::InputCountMismatch { files: 1, buffers: 2 }
    ));
    assert_eq!(log.count(Call::Execute), 0);
    assert_eq!(log.count(Call::Release), 0);
    assert_eq!(log.count(Call::Close), 0);
}

#[test]
fn extra_input_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        write(dir.path(), "a.bin", &[0; 4]),
        write(dir.path(), "b.bin", &[0; 8]),
        write(dir.path(), "c.bin", &[0; 8]),
    ];
    let backend = two_in_one_out();
    let log = backend.log();
    let config = HarnessConfig {
        model: "model".into(),
        inputs: files,
        ..Default::default()
    };

    let (result, _) = run(backend, config);
    assert!(matches!(
        result.unwrap_err(),
        HarnessError::InputCountMismatch { files: 3, buffers: 2 }
    ));
    assert_eq!(log.count(Call::Execute), 0);
}

#[test]
fn usage_error_never_touches_backend() {
    let backend = two_in_one_out();
    let log = backend.log();
    let config = HarnessConfig {
        model: "model".into(),
        ..Default::default()
    };

    let (result, report) = run(backend, config);
    match result.unwrap_err() {
        HarnessError::Usage(msg) => assert_eq!(msg, MISSING_INPUTS_MESSAGE),
        other => panic!("unexpected error: {other}"),
    }
    assert!(log.calls().is_empty());
    assert!(report.is_empty());
}

#[test]
fn force_mode_skips_loading_and_validation() {
    let dir = tempfile::tempdir().unwrap();
    let golden = write(dir.path(), "g.bin", &f32_bytes(&[5.0]));

    let backend = two_in_one_out();
    let log = backend.log();
    let config = HarnessConfig {
        model: "model".into(),
        force: true,
        goldens: vec![golden],
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let (result, report) = run(backend, config);
    let summary = result.unwrap();
    assert!(summary.outputs.is_empty());
    assert_eq!(log.count(Call::OutputInfo), 0);
    assert_eq!(log.input_snapshots(), vec![vec![vec![0; 4], vec![0; 8]]]);
    assert!(!report.contains("Output Layer"));
    assert!(!dir.path().join("output0.bin").exists());
}

#[test]
fn golden_count_mismatch_dumps_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new()
        .with_input(2)
        .with_output(ElementType::UInt8, vec![1, 2, 3])
        .with_output(ElementType::Int16, vec![4, 5]);
    let log = backend.log();
    let config = HarnessConfig {
        model: "model".into(),
        inputs: vec![write(dir.path(), "in.bin", &[0, 0])],
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let (result, report) = run(backend, config);
    let summary = result.unwrap();

    assert!(report.contains("Number of golden files and output layers mismatch.\n\tDumping output layers.\n"));
    assert!(!report.contains("snr value"));
    assert_eq!(
        summary.outputs,
        vec![
            OutputReport::Dumped(dir.path().join("output0.bin")),
            OutputReport::Dumped(dir.path().join("output1.bin")),
        ]
    );
    assert_eq!(std::fs::read(dir.path().join("output0.bin")).unwrap(), vec![1, 2, 3]);
    assert_eq!(std::fs::read(dir.path().join("output1.bin")).unwrap(), vec![4, 5]);
    assert_eq!(log.count(Call::OutputInfo), 0);
    assert_eq!(log.count(Call::Deinitialize), 1);
}

#[test]
fn mismatching_golden_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new()
        .with_input(1)
        .with_output(ElementType::Float32, f32_bytes(&[1.0, 2.0, 3.0]));
    let config = HarnessConfig {
        model: "model".into(),
        inputs: vec![write(dir.path(), "in.bin", &[0])],
        goldens: vec![write(dir.path(), "g.bin", &f32_bytes(&[1.0, 2.5, 3.0]))],
        threshold: 0.1,
        ..Default::default()
    };

    let (result, report) = run(backend, config);
    let summary = result.unwrap();
    assert!(!summary.all_matched());
    assert_eq!(summary.outputs[0].outcome().unwrap().diff_count, 1);
    assert!(report.contains("Golden Mismatch\n-\tdifferent indices:1\n-\tsnr value:"));
}

#[test]
fn execute_failure_aborts_remaining_iterations() {
    let backend = two_in_one_out().failing_on_nth(Call::Execute, 2);
    let log = backend.log();
    let config = HarnessConfig {
        model: "model".into(),
        force: true,
        iterations: 5,
        ..Default::default()
    };

    let (result, report) = run(backend, config);
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Backend {
            stage: Stage::Execute,
            ..
        }
    ));
    assert!(err.to_string().starts_with("Failed to Execute Model"));
    assert_eq!(log.count(Call::Execute), 2);
    assert_eq!(log.count(Call::Release), 0);
    assert!(report.contains("Model Execution Time (1)"));
    assert!(!report.contains("Model Execution Time (2)"));
    assert!(!report.contains("Avg."));
}

#[test]
fn allocation_failure_does_not_close_model() {
    let backend = two_in_one_out().failing_on(Call::Allocate);
    let log = backend.log();
    let config = HarnessConfig {
        model: "model".into(),
        force: true,
        ..Default::default()
    };

    let (result, _) = run(backend, config);
    assert!(matches!(
        result.unwrap_err(),
        HarnessError::Backend {
            stage: Stage::AllocateBuffers,
            ..
        }
    ));
    assert_eq!(log.calls(), vec![Call::Initialize, Call::Open, Call::Allocate]);
}

#[test]
fn teardown_failures_are_reported_by_stage() {
    for (call, stage) in [
        (Call::Release, Stage::ReleaseBuffers),
        (Call::Close, Stage::CloseModel),
        (Call::Deinitialize, Stage::Deinitialize),
    ] {
        let backend = two_in_one_out().failing_on(call);
        let config = HarnessConfig {
            model: "model".into(),
            force: true,
            ..Default::default()
        };
        let (result, _) = run(backend, config);
        match result.unwrap_err() {
            HarnessError::Backend { stage: got, .. } => assert_eq!(got, stage),
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn stages_can_be_driven_one_at_a_time() {
    let dir = tempfile::tempdir().unwrap();
    let config = HarnessConfig {
        model: "model".into(),
        inputs: vec![
            write(dir.path(), "a.bin", &[0; 4]),
            write(dir.path(), "b.bin", &[0; 8]),
        ],
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let mut out = Vec::new();
    let opened = Session::new(two_in_one_out(), config, Palette::plain())
        .unwrap()
        .open(&mut out)
        .unwrap();
    let info = opened.buffer_info();
    assert_eq!((info.n_in_buf, info.n_out_buf), (2, 1));

    let executed = opened.load_inputs().unwrap().execute(&mut out).unwrap();
    assert_eq!(executed.timings().iterations(), 1);

    let validated = executed.validate(&mut out).unwrap();
    assert!(matches!(validated.outputs()[0], OutputReport::Dumped(_)));
    validated.finish().unwrap();
}

/// The reference backend sums input bytes, so `[0, 0, 128, 63]` plus zeros
/// reproduces `[0, 0, 128, 63]`, which is `1.0f32` on little-endian hosts.
#[test]
fn manifest_backend_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let model = write(
        dir.path(),
        "model.toml",
        br#"
name = "two-in-one-out"

[[inputs]]
name = "a"
element_type = "uint8"
width = 4

[[inputs]]
name = "b"
element_type = "float32"
width = 2

[[outputs]]
name = "y"
element_type = "float32"
"#,
    );
    let in0 = write(dir.path(), "in0.bin", &[0, 0, 128, 63]);
    let in1 = write(dir.path(), "in1.bin", &[0; 8]);
    let golden = write(dir.path(), "golden0.bin", &[0, 0, 128, 63]);

    let config = HarnessConfig {
        model: model.display().to_string(),
        inputs: vec![in0, in1],
        goldens: vec![golden],
        ..Default::default()
    };

    let mut out = Vec::new();
    let summary = run_harness(ManifestBackend::new(), config, Palette::plain(), &mut out).unwrap();
    let outcome = summary.outputs[0].outcome().unwrap();
    assert_eq!(outcome.element_type, ElementType::Float32);
    assert_eq!(outcome.diff_count, 0);
    assert_eq!(outcome.snr, f64::INFINITY);
}
