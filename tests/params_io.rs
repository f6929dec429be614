use phylonco_rs::io::params::{
    GompertzConfig, Gt16Config, ModelParamsFile, TernaryErrorConfig, load_params, save_params,
};
use phylonco_rs::Gt16Model;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_path(prefix: &str, ext: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time is before unix epoch")
        .as_nanos();
    path.push(format!("{prefix}_{}_{}.{}", std::process::id(), nanos, ext));
    path
}

#[test]
fn params_json_roundtrip() {
    let path = unique_temp_path("phylonco_params", "json");
    let params = ModelParamsFile {
        error_model: Some(TernaryErrorConfig {
            alpha: 0.01,
            beta: 0.2,
            exclude: vec!["normal".to_string()],
        }),
        substitution: Some(Gt16Config {
            rate_ac: 1.0,
            rate_ag: 4.0,
            rate_at: 0.5,
            rate_cg: 1.0,
            rate_ct: 4.0,
            rate_gt: 1.0,
            rates: None,
            frequencies: Some(vec![1.0 / 16.0; 16]),
        }),
        population: Some(GompertzConfig {
            f0: 0.1,
            b: 0.5,
            n0: 100.0,
            id: Some("gompertz".to_string()),
            tree_id: Some("tree".to_string()),
            max_evaluations: None,
        }),
    };

    save_params(&path, &params).expect("failed to save params");
    let loaded = load_params(&path).expect("failed to load params");
    assert_eq!(loaded, params);

    let _ = fs::remove_file(path);
}

#[test]
fn sections_are_optional() {
    let path = unique_temp_path("phylonco_params_partial", "json");
    fs::write(&path, r#"{ "population": { "f0": 0.1, "b": 0.5, "n0": 100.0 } }"#)
        .expect("failed to write params");

    let loaded = load_params(&path).expect("failed to load params");
    assert!(loaded.error_model.is_none());
    assert!(loaded.substitution.is_none());
    let pop = loaded.population.expect("population section missing");
    assert_eq!(pop.id, None);
    assert_eq!(pop.max_evaluations, None);

    let _ = fs::remove_file(path);
}

#[test]
fn aggregate_rates_in_file_are_rejected_when_building() {
    let path = unique_temp_path("phylonco_params_rates", "json");
    fs::write(
        &path,
        r#"{ "substitution": { "rate_ac": 1, "rate_ag": 1, "rate_at": 1, "rate_cg": 1,
              "rate_ct": 1, "rate_gt": 1, "rates": [1, 1, 1, 1, 1, 1] } }"#,
    )
    .expect("failed to write params");

    let loaded = load_params(&path).expect("failed to load params");
    let cfg = loaded.substitution.expect("substitution section missing");
    assert!(Gt16Model::from_config(&cfg).is_err());

    let _ = fs::remove_file(path);
}

#[test]
fn malformed_file_reports_path() {
    let path = unique_temp_path("phylonco_params_bad", "json");
    fs::write(&path, "{ not json").expect("failed to write params");
    let err = load_params(&path).expect_err("expected parse error");
    assert!(format!("{err:#}").contains("failed to parse"));
    let _ = fs::remove_file(path);
}
