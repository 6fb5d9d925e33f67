use moesi_core::SimError;
use moesi_core::config::SystemConfig;
use pretty_assertions::assert_eq;

#[test]
fn default_config_derives_a_four_bit_address_width() {
    assert_eq!(SystemConfig::default().validate().unwrap(), 4);
}

#[test]
fn scenario_config_derives_a_two_bit_address_width() {
    let cfg = SystemConfig {
        n_processors: 2,
        memory_size: 4,
        cache_capacity: 4,
        associativity: 1,
        frequency_hz: 1.0,
    };
    assert_eq!(cfg.validate().unwrap(), 2);
}

#[test]
fn deserializes_from_a_scenario_json_document() {
    let json = r#"{
        "n_processors": 3,
        "memory_size": 8,
        "cache_capacity": 2,
        "associativity": 1,
        "frequency_hz": 4.0
    }"#;
    let cfg: SystemConfig = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.n_processors, 3);
    assert_eq!(cfg.validate().unwrap(), 3);
}

#[test]
fn rejects_a_frequency_at_the_open_upper_bound() {
    let cfg = SystemConfig {
        frequency_hz: 8.0,
        ..SystemConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(SimError::InvalidFrequency(f)) if f == 8.0));
}

#[test]
fn rejects_a_zero_cache_capacity() {
    let cfg = SystemConfig {
        cache_capacity: 0,
        ..SystemConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(SimError::InvalidCacheCapacity(0))));
}
