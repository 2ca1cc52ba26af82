use std::fs;

use tomasulo_core::config::{BranchPrediction, Config};
use tomasulo_core::sim::Simulator;

use crate::common::{program, programs};

#[test]
fn test_config_file_drives_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.json");
    fs::write(
        &path,
        r#"{
            "general": { "max_cycles": 10000, "shuffle": true, "shuffle_seed": 99 },
            "memory": { "size_bytes": 4096 },
            "pipeline": { "branch_prediction": "Taken" }
        }"#,
    )
    .unwrap();

    let config = Config::from_json_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(config.general.shuffle);
    assert_eq!(config.general.shuffle_seed, 99);
    assert_eq!(config.memory.size_bytes, 4096);
    assert_eq!(config.pipeline.branch_prediction, BranchPrediction::Taken);

    let (words, code) = programs::fibonacci();
    let mut sim = Simulator::new(&config, &program(&words));
    assert_eq!(sim.run().unwrap(), code);
    assert_eq!(sim.cpu().ram().len(), 4096);
}

#[test]
fn test_partial_sections_keep_defaults() {
    let config = Config::from_json_str(r#"{ "general": { "start_pc": 256 } }"#).unwrap();
    let defaults = Config::default();
    assert_eq!(config.general.start_pc, 256);
    assert_eq!(config.general.shuffle_seed, defaults.general.shuffle_seed);
    assert_eq!(config.memory.size_bytes, defaults.memory.size_bytes);
    assert_eq!(
        config.pipeline.branch_prediction,
        BranchPrediction::BackwardTaken
    );
}

#[test]
fn test_malformed_documents() {
    assert!(Config::from_json_str("{ general: }").is_err());
    assert!(Config::from_json_str(r#"{ "general": { "max_cycles": -1 } }"#).is_err());
}
