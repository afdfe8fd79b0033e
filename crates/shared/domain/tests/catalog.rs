use lvai_domain::config::ApiConfig;
use lvai_domain::lottery::LotteryType;
use serde_json::json;
use strum::IntoEnumIterator;

#[test]
fn every_game_has_consistent_rules() {
    for lottery in LotteryType::iter() {
        let rules = lottery.rules();
        assert!(rules.numbers_count > 0);
        assert!(rules.numbers_count <= rules.max_number, "{lottery} draws more numbers than it has");
        if let Some(special) = rules.special_max {
            assert!(special >= 1);
        }
    }
}

#[test]
fn api_config_deserializes_partial_sections() {
    let raw = json!({
        "app": { "debug": true },
        "server": { "port": 9000 },
        "security": { "jwt": { "secret": "0123456789abcdef0123456789abcdef" } },
        "ai": { "api_key": "sk-test" }
    });

    let config: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert!(config.app.debug);
    assert_eq!(config.app.name, "LotteryVision");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.cors_origins.len(), 2);
    assert_eq!(config.security.jwt.issuer, "lvai");
    assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.ai.base_url, "https://api.manus.ai/v1");
    assert!(config.validate().is_ok());
}
