//! End-to-end tests: config file and JSON batch through the pipeline.

use std::io::Write;

use analytics::TrendDirection;
use ndvi_engine::{BatchInput, EngineConfig, Pipeline, RejectionReason};
use storage::MemoryCache;
use test_utils::{raw_observation, reference_date, series};

fn batch_json() -> String {
    let last = series::FALLING.len() as i64 - 1;
    let mut observations: Vec<_> = series::FALLING
        .iter()
        .enumerate()
        .map(|(i, &mean)| raw_observation("orchard", last - i as i64, mean, 0.1))
        .collect();
    observations.push(raw_observation("orchard", 3, 0.5, 0.95));

    serde_json::json!({
        "observations": observations,
        "baselines": {"orchard": {"mean": 0.6, "std": 0.1}}
    })
    .to_string()
}

#[tokio::test]
async fn test_batch_from_files() {
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(config_file, "cache:\n  max_entries: 64\nanalytics:\n  trend_threshold: 0.05\n").unwrap();
    let config = EngineConfig::from_yaml_file(config_file.path()).unwrap();
    config.validate().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("batch.json");
    std::fs::write(&input_path, batch_json()).unwrap();
    let input = BatchInput::from_json(&std::fs::read_to_string(&input_path).unwrap()).unwrap();

    let pipeline = Pipeline::new(MemoryCache::new(config.cache.max_entries), &config).unwrap();
    let report = pipeline.run(input, reference_date(), None).await.unwrap();

    assert_eq!(report.assessed, 7);
    assert_eq!(report.included, 6);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].reason, RejectionReason::SceneUnusable);

    let field = &report.fields[0];
    assert_eq!(field.summary.trend, TrendDirection::Falling);
    let comparison = field.comparison.expect("baseline supplied");
    assert!(comparison.z_score < 0.0);
    assert!(field.comparison_error.is_none());
}

#[tokio::test]
async fn test_report_serializes() {
    let input = BatchInput::from_json(&batch_json()).unwrap();
    let pipeline = Pipeline::new(MemoryCache::default(), &EngineConfig::default()).unwrap();
    let report = pipeline.run(input, reference_date(), None).await.unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["fields"][0]["summary"]["trend"], "falling");
    assert_eq!(value["rejected"][0]["reason"], "scene_unusable");
    assert_eq!(value["backend"], "memory");
}
