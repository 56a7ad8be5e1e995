//! Integration tests for manifest env resolution

use insta::assert_snapshot;
use manifest_expr::config::{InvalidValuePolicy, ResolverConfig};
use manifest_expr::manifest::{EnvResolver, ManifestError};
use serde_json::{json, Value};

fn squid(deploy: Value) -> Value {
    json!({
        "manifest_version": "subsquid.io/v0.1",
        "name": "test",
        "version": 1,
        "deploy": deploy
    })
}

#[test]
fn test_missing_sections_are_not_added() {
    let doc = squid(json!({"processor": {"name": "processor"}}));
    let resolved = EnvResolver::default().resolve(&doc, &json!({})).unwrap();
    assert_eq!(resolved, doc);
    assert!(resolved["deploy"].get("env").is_none());
    assert!(resolved["deploy"].get("api").is_none());
}

#[test]
fn test_resolve_every_section() {
    let doc = squid(json!({
        "env": {"GLOBAL": "${{secrets.GLOBAL}}"},
        "init": {"env": {"INIT": "${{secrets.INIT}}"}},
        "api": {"env": {"API": "${{secrets.API}}"}},
        "addons": {"hasura": {"env": {"HASURA": "${{secrets.HASURA}}"}}},
        "processor": [
            {"name": "eth", "env": {"RPC": "${{addons.rpc.eth}}"}},
            {"name": "base", "env": {"RPC": "${{addons.rpc.base}}"}}
        ]
    }));
    let ctx = json!({
        "secrets": {"GLOBAL": "g", "INIT": "i", "API": "a", "HASURA": "h"},
        "addons": {"rpc": {"eth": "eth-rpc", "base": "base-rpc"}}
    });

    let resolved = EnvResolver::default().resolve(&doc, &ctx).unwrap();
    let deploy = &resolved["deploy"];
    assert_eq!(deploy["env"]["GLOBAL"], "g");
    assert_eq!(deploy["init"]["env"]["INIT"], "i");
    assert_eq!(deploy["api"]["env"]["API"], "a");
    assert_eq!(deploy["addons"]["hasura"]["env"]["HASURA"], "h");
    assert_eq!(deploy["processor"][0]["env"]["RPC"], "eth-rpc");
    assert_eq!(deploy["processor"][1]["env"]["RPC"], "base-rpc");
    assert_eq!(deploy["processor"][1]["name"], "base");
}

#[test]
fn test_input_document_is_not_modified() {
    let doc = squid(json!({"env": {"foo": "${{foo}}"}}));
    let before = doc.clone();
    let resolved = EnvResolver::default()
        .resolve(&doc, &json!({"foo": "value1"}))
        .unwrap();
    assert_eq!(resolved["deploy"]["env"]["foo"], "value1");
    assert_eq!(doc, before);
}

#[test]
fn test_parse_error_report() {
    let doc = squid(json!({"env": {"foo": "${{foo.}}", "bar": "bar", "baz": "${{baz}}"}}));
    let err = EnvResolver::default()
        .resolve(&doc, &json!({"foo": "value1", "baz": "value2"}))
        .unwrap_err();
    assert_snapshot!(err.to_string(), @r#"
Evaluation error occurred:
  1) Manifest env variable "deploy.env.foo" can not be mapped to "${{foo.}}": Unexpected token '.' [6]
"#);
}

#[test]
fn test_processor_index_in_report() {
    let doc = squid(json!({"processor": [{"name": "processor", "env": {"foo": "${{foo.}}"}}]}));
    let err = EnvResolver::default()
        .resolve(&doc, &json!({"foo": "value1"}))
        .unwrap_err();
    assert_snapshot!(err.to_string(), @r#"
Evaluation error occurred:
  1) Manifest env variable "deploy.processor.[0].env.foo" can not be mapped to "${{foo.}}": Unexpected token '.' [6]
"#);
}

#[test]
fn test_collected_report() {
    let doc = squid(json!({
        "env": {
            "DB": "postgres://${{secrets.USER}}:${{secrets.PASS}}@db",
            "LIST": ["a"],
            "PORT": 5432
        },
        "api": {"env": {"MODE": "${{settings.mode}}"}}
    }));
    let ctx = json!({"secrets": {"USER": "app"}, "settings": {"mode": {"nested": true}}});
    let err = EnvResolver::default().resolve(&doc, &ctx).unwrap_err();
    assert_snapshot!(err.to_string(), @r#"
Evaluation error occurred:
  1) Manifest env variable "deploy.env.DB" can not be mapped to "postgres://${{secrets.USER}}:${{secrets.PASS}}@db": "secrets.PASS" was not resolved to any value
  2) "deploy.env.LIST" must be a string
  3) Manifest env variable "deploy.api.env.MODE" can not be mapped to "${{settings.mode}}": "settings.mode" is not serializable
"#);
}

#[test]
fn test_deeply_nested_value_is_reported_per_entry() {
    let deep = format!("${{{{{}a{}}}}}", "(".repeat(10_000), ")".repeat(10_000));
    let doc = squid(json!({"env": {"DEEP": deep, "OK": "${{ok}}"}}));
    let err = EnvResolver::default()
        .resolve(&doc, &json!({"a": "x", "ok": "y"}))
        .unwrap_err();
    assert_eq!(err.details().len(), 1);
    assert!(err.details()[0].starts_with("Manifest env variable \"deploy.env.DEEP\""));
    assert!(err.details()[0].ends_with(": Unexpected token '(' [259]"));
}

#[test]
fn test_preserve_policy_from_config() {
    let config = ResolverConfig::from_toml_str(
        r#"
env_paths = ["deploy.env"]
on_invalid = "preserve"
"#,
    )
    .unwrap();
    let doc = squid(json!({
        "env": {"A": "${{a}}", "B": "${{missing}}"},
        "api": {"env": {"C": "${{a}}"}}
    }));
    let resolved = EnvResolver::new(config)
        .resolve(&doc, &json!({"a": "resolved"}))
        .unwrap();
    assert_eq!(resolved["deploy"]["env"]["A"], "resolved");
    assert_eq!(resolved["deploy"]["env"]["B"], "${{missing}}");
    // not in env_paths
    assert_eq!(resolved["deploy"]["api"]["env"]["C"], "${{a}}");
}

#[test]
fn test_policy_override() {
    let resolver =
        EnvResolver::new(ResolverConfig::default().with_policy(InvalidValuePolicy::Preserve));
    assert_eq!(resolver.config().on_invalid, InvalidValuePolicy::Preserve);
    assert_eq!(resolver.config().env_paths.len(), 5);
    let doc = squid(json!({"env": {"X": 1, "Y": "${{y}}"}}));
    let resolved = resolver.resolve(&doc, &json!({})).unwrap();
    assert_eq!(resolved["deploy"]["env"]["X"], "1");
    assert_eq!(resolved["deploy"]["env"]["Y"], "${{y}}");
}

#[test]
fn test_secret_variables() {
    let doc = squid(json!({
        "env": {"GLOBAL": "${{secrets.GLOBAL}}"},
        "processor": {"name": "processor", "env": {"PROCESSOR": "${{secrets.PROCESSOR}}"}},
        "api": {"env": {"API": "${{secrets.API}}"}},
        "init": {"env": {"INIT": "${{secrets.INIT}}", "MISSING": "${{rpc.INIT_DOWN}}"}}
    }));
    let mut vars = EnvResolver::default().variables(&doc, &["secrets"]).unwrap();
    vars.sort();
    assert_eq!(vars, vec!["API", "GLOBAL", "INIT", "PROCESSOR"]);
}

#[test]
fn test_variables_validation_report() {
    let doc = squid(json!({"env": {"A": "${{secrets.}}", "B": null}}));
    let err = EnvResolver::default()
        .variables(&doc, &["secrets"])
        .unwrap_err();
    assert!(matches!(err, ManifestError::Validation(_)));
    assert_snapshot!(err.to_string(), @r#"
Validation error occurred:
  1) Manifest env variable "deploy.env.A" can not be mapped to "${{secrets.}}": Unexpected token '.' [10]
  2) "deploy.env.B" must be a string
"#);
}
