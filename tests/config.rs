use chrono::Weekday;
use slot_engine::config::{ConfigError, EngineConfig, ExperimentConfig};
use slot_engine::types::TimeWindow;

#[test]
fn defaults_are_explicit_and_valid() {
    let config = EngineConfig::default();
    config.validate().unwrap();

    let exp = &config.experiment;
    assert_eq!(
        exp.baseline_windows,
        vec![
            TimeWindow::new(Weekday::Tue, 10).unwrap(),
            TimeWindow::new(Weekday::Thu, 11).unwrap()
        ]
    );
    assert_eq!(exp.experiment_spread_hours, 2);
    assert_eq!((exp.earliest_hour, exp.latest_hour), (6, 22));
    assert_eq!(exp.min_trials_for_winner, 3);
    assert_eq!(config.index.min_index_items, 5);
    assert_eq!(config.aggregator.utc_offset_minutes, 0);
    assert_eq!(ExperimentConfig::v0(), ExperimentConfig::default());
}

#[test]
fn parses_partial_documents_over_defaults() {
    let config = EngineConfig::from_json_str(
        r#"{
            "experiment": {
                "windows": [{"day": "Wed", "hour": 14}, {"day": "Fri", "hour": 12}],
                "experiment_spread_hours": 1,
                "epsilon": 0.25
            },
            "aggregator": {"utc_offset_minutes": 60}
        }"#,
    )
    .unwrap();

    assert_eq!(config.experiment.baseline_windows.len(), 2);
    assert_eq!(config.experiment.experiment_spread_hours, 1);
    assert_eq!(config.experiment.epsilon, 0.25);
    assert_eq!(config.experiment.prune_fraction, 0.5);
    assert_eq!(config.index, Default::default());
    assert_eq!(config.aggregator.offset().local_minus_utc(), 3600);

    // Serializes back under the same keys.
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["experiment"]["windows"][0]["day"], "Wed");
}

#[test]
fn out_of_range_values_are_rejected() {
    let cases = [
        r#"{"experiment": {"epsilon": 1.5}}"#,
        r#"{"experiment": {"prune_fraction": -0.1}}"#,
        r#"{"experiment": {"min_trials_for_winner": 0}}"#,
        r#"{"experiment": {"experiment_spread_hours": 30}}"#,
        r#"{"experiment": {"latest_hour": 24}}"#,
        r#"{"index": {"min_similarity": 2.0}}"#,
        r#"{"aggregator": {"utc_offset_minutes": 1440}}"#,
    ];
    for raw in cases {
        let err = EngineConfig::from_json_str(raw).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }), "{raw}: {err}");
    }

    let inverted = EngineConfig::from_json_str(r#"{"experiment": {"earliest_hour": 20, "latest_hour": 8}}"#);
    assert!(matches!(
        inverted,
        Err(ConfigError::InvertedHours {
            earliest: 20,
            latest: 8
        })
    ));

    let empty = EngineConfig::from_json_str(r#"{"experiment": {"windows": []}}"#);
    assert!(matches!(empty, Err(ConfigError::NoBaselines)));

    let bad_day = EngineConfig::from_json_str(r#"{"experiment": {"windows": [{"day": "Xyz", "hour": 1}]}}"#);
    assert!(matches!(bad_day, Err(ConfigError::Malformed(_))));
}
