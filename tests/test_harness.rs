//! End-to-end tests for the robustness evaluation.
//!
//! Tests cover:
//! - Bucket assignment over the whole unit interval
//! - Per-image outcome IoU and its bucket
//! - Always-correct, always-wrong and always-failing classifiers
//! - Skipping undecodable images
//! - Parallel evaluation matching across worker counts

mod common;

use common::*;
use iou_robustness::harness::evaluate_entry;
use rand::Rng;

#[test]
fn test_bucket_assignment_is_total_and_exclusive() {
    let mut rng = seeded_rng(2024);
    let mut stats = BucketStats::new();

    for _ in 0..10_000 {
        let value: f64 = rng.gen_range(0.0..=1.0);
        let key = BucketKey::from_iou(value);
        let (low, high) = key.range();
        assert!(value >= low, "{} below bucket {}", value, key);
        if key == BucketKey::HIGHEST {
            assert!(value <= high);
        } else {
            assert!(value < high, "{} above bucket {}", value, key);
        }
        stats.record(key, true);
    }

    assert_eq!(stats.total(), 10_000);
    assert_eq!(BucketKey::from_iou(0.3).range(), (0.3, 0.4));
}

#[test]
fn test_correct_classifier_counts_everything_correct() -> anyhow::Result<()> {
    let (dataset, _dir) = create_test_dataset(&[("red", RED), ("blue", BLUE)], 5);

    let stats = evaluate(&dataset, &rgb_classifier(), &DistortionConfig::default(), &mut seeded_rng(1))?;

    assert_eq!(stats.total_correct(), 10);
    assert_eq!(stats.total_incorrect(), 0);
    assert_eq!(stats.skipped(), 0);
    Ok(())
}

#[test]
fn test_wrong_classifier_counts_everything_incorrect() -> anyhow::Result<()> {
    let (dataset, _dir) = create_test_dataset(&[("red", RED), ("green", GREEN)], 4);

    let classifier = FixedClassifier::new("not-a-class");
    let stats = evaluate(&dataset, &classifier, &DistortionConfig::default(), &mut seeded_rng(2))?;

    assert_eq!(stats.total_correct(), 0);
    assert_eq!(stats.total_incorrect(), 8);
    Ok(())
}

#[test]
fn test_failing_classifier_skips_every_image() -> anyhow::Result<()> {
    let (dataset, _dir) = create_test_dataset(&[("red", RED)], 6);

    let stats = evaluate(&dataset, &SilentClassifier, &DistortionConfig::default(), &mut seeded_rng(3))?;

    assert_eq!(stats.total(), 0);
    assert_eq!(stats.skipped(), 6);
    for key in BucketKey::all() {
        assert_eq!(stats.correct(key) + stats.incorrect(key), 0);
    }
    Ok(())
}

#[test]
fn test_undecodable_image_is_skipped() -> anyhow::Result<()> {
    let (dataset, dir) = create_test_dataset(&[("blue", BLUE)], 3);
    std::fs::write(dir.path().join("blue").join("broken.png"), b"not a png")?;

    let stats = evaluate(&dataset, &rgb_classifier(), &DistortionConfig::default(), &mut seeded_rng(4))?;

    assert_eq!(stats.total_correct(), 3);
    assert_eq!(stats.skipped(), 1);
    Ok(())
}

#[test]
fn test_missing_dataset_root_is_an_error() {
    let dataset = DirectoryDataset::new("/nonexistent/iou-robustness/dataset");
    let result = evaluate(&dataset, &rgb_classifier(), &DistortionConfig::default(), &mut seeded_rng(5));
    assert!(result.is_err());
}

#[test]
fn test_parallel_result_does_not_depend_on_worker_count() -> anyhow::Result<()> {
    let (dataset, _dir) = create_test_dataset(&[("red", RED), ("green", GREEN), ("blue", BLUE)], 7);
    let config = DistortionConfig::default();
    let classifier = rgb_classifier();

    let single = evaluate_parallel(&dataset, &classifier, &config, 1, 42)?;
    let many = evaluate_parallel(&dataset, &classifier, &config, 4, 42)?;

    assert_eq!(single, many);
    assert_eq!(many.total_correct(), 21);
    Ok(())
}

#[test]
fn test_report_serializes_both_mappings() -> anyhow::Result<()> {
    let mut stats = BucketStats::new();
    stats.record(BucketKey::from_iou(0.95), true);
    stats.record(BucketKey::from_iou(0.05), false);

    let json = serde_json::to_value(stats.report())?;
    assert_eq!(json["correct"]["10"], 1);
    assert_eq!(json["incorrect"]["2"], 1);
    assert_eq!(json["skipped"], 0);
    Ok(())
}

#[test]
fn test_entry_outcome_reports_iou_of_its_bucket() -> anyhow::Result<()> {
    let (dataset, _dir) = create_test_dataset(&[("green", GREEN)], 3);
    let classifier = rgb_classifier();
    let mut rng = seeded_rng(9);

    for entry in dataset.entries()? {
        let outcome = evaluate_entry(&dataset, &classifier, &DistortionConfig::default(), &entry, &mut rng)?;
        assert!((0.0..=1.0).contains(&outcome.iou), "{}", outcome.iou);
        assert_eq!(outcome.key, BucketKey::from_iou(outcome.iou));
        assert!(outcome.correct);
    }

    let still = DistortionConfig::new().with_strength(0.0)?;
    let entry = &dataset.entries()?[0];
    let outcome = evaluate_entry(&dataset, &classifier, &still, entry, &mut rng)?;
    assert_eq!(outcome.iou, 1.0);
    assert_eq!(outcome.key, BucketKey::HIGHEST);
    Ok(())
}
