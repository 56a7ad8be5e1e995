//! Env-section resolution for deployment manifests
//!
//! A manifest arrives as an already-deserialized document. The resolver
//! visits the env maps at the configured dotted paths and substitutes the
//! `${{ ... }}` spans of every value against a runtime context. Failures are
//! collected across all entries and reported together.
//!
//! Arrays met along a path fan out: with `deploy.processor.env` and a
//! `processor` list, every element's `env` is visited and reported as
//! `deploy.processor.[0].env`, `deploy.processor.[1].env`, and so on.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{InvalidValuePolicy, ResolverConfig};
use crate::expression::{dedup, EvalValue};
use crate::template::{SpanError, Template};

/// Aggregated manifest failure, one detail per problem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("{}", format_details("Evaluation error occurred", .0))]
    Evaluation(Vec<String>),

    #[error("{}", format_details("Validation error occurred", .0))]
    Validation(Vec<String>),
}

impl ManifestError {
    pub fn details(&self) -> &[String] {
        match self {
            Self::Evaluation(details) | Self::Validation(details) => details,
        }
    }
}

fn format_details(base: &str, details: &[String]) -> String {
    std::iter::once(format!("{}:", base))
        .chain(
            details
                .iter()
                .enumerate()
                .map(|(i, detail)| format!("  {}) {}", i + 1, detail)),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

fn mapping_error(path: &str, raw: &str, failure: &SpanError) -> String {
    format!(
        "Manifest env variable \"{}\" can not be mapped to \"{}\": {}",
        path, raw, failure
    )
}

fn not_a_string(path: &str) -> String {
    format!("\"{}\" must be a string", path)
}

/// One value of an env map
#[derive(Debug, Clone, PartialEq)]
pub struct EnvEntry<'a> {
    /// Dotted path including the key, e.g. `deploy.processor.[0].env.RPC`
    pub path: String,
    /// JSON pointer to the value inside the document
    pub pointer: String,
    pub value: &'a Value,
}

/// Resolves manifest env sections against a context
#[derive(Debug, Clone, Default)]
pub struct EnvResolver {
    config: ResolverConfig,
}

impl EnvResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// All env values found at the configured paths, in path order
    pub fn entries<'a>(&self, document: &'a Value) -> Vec<EnvEntry<'a>> {
        let mut entries = Vec::new();
        for env_path in &self.config.env_paths {
            let segments: Vec<&str> = env_path.split('.').collect();
            collect_entries(document, &segments, &mut Vec::new(), String::new(), &mut entries);
        }
        entries
    }

    /// Return a copy of `document` with every env value substituted
    ///
    /// The input document is never modified. Under [`InvalidValuePolicy::Fail`]
    /// any failure rejects the whole document with every detail collected;
    /// under [`InvalidValuePolicy::Preserve`] failing values keep their raw
    /// text and each failure is logged.
    pub fn resolve(&self, document: &Value, context: &Value) -> Result<Value, ManifestError> {
        let entries = self.entries(document);
        debug!(entries = entries.len(), "Resolving manifest env");

        let mut resolved = document.clone();
        let mut details = Vec::new();

        for entry in &entries {
            let replacement = match entry.value {
                Value::String(raw) => {
                    let template = Template::parse(raw);
                    if !template.has_expressions() {
                        continue;
                    }
                    let (output, failures) = template.render_lossy(context);
                    details.extend(
                        failures
                            .iter()
                            .map(|failure| mapping_error(&entry.path, raw, failure)),
                    );
                    if failures.is_empty() {
                        output
                    } else {
                        continue;
                    }
                }
                Value::Bool(_) | Value::Number(_) => EvalValue::Json(entry.value)
                    .to_primitive_string()
                    .unwrap_or_default(),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    details.push(not_a_string(&entry.path));
                    continue;
                }
            };

            if let Some(slot) = resolved.pointer_mut(&entry.pointer) {
                *slot = Value::String(replacement);
            }
        }

        if details.is_empty() {
            return Ok(resolved);
        }

        match self.config.on_invalid {
            InvalidValuePolicy::Fail => Err(ManifestError::Evaluation(details)),
            InvalidValuePolicy::Preserve => {
                for detail in &details {
                    warn!("{}", detail);
                }
                Ok(resolved)
            }
        }
    }

    /// Unique variables read under `prefix` by every env value
    pub fn variables<S: AsRef<str>>(
        &self,
        document: &Value,
        prefix: &[S],
    ) -> Result<Vec<String>, ManifestError> {
        let mut names = Vec::new();
        let mut details = Vec::new();

        for entry in self.entries(document) {
            match entry.value {
                Value::String(raw) => match Template::parse(raw).variables(prefix) {
                    Ok(vars) => names.extend(vars),
                    Err(err) => details.extend(
                        err.errors
                            .iter()
                            .map(|failure| mapping_error(&entry.path, raw, failure)),
                    ),
                },
                Value::Bool(_) | Value::Number(_) => {}
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    details.push(not_a_string(&entry.path));
                }
            }
        }

        if details.is_empty() {
            Ok(dedup(names))
        } else {
            Err(ManifestError::Validation(details))
        }
    }
}

fn collect_entries<'a>(
    value: &'a Value,
    segments: &[&str],
    display: &mut Vec<String>,
    pointer: String,
    out: &mut Vec<EnvEntry<'a>>,
) {
    match (value, segments.split_first()) {
        (Value::Object(env), None) => {
            let base = display.join(".");
            for (key, value) in env {
                out.push(EnvEntry {
                    path: format!("{}.{}", base, key),
                    pointer: format!("{}/{}", pointer, escape_pointer(key)),
                    value,
                });
            }
        }
        (_, None) => {}
        (Value::Array(items), Some(_)) => {
            for (i, item) in items.iter().enumerate() {
                display.push(format!("[{}]", i));
                collect_entries(item, segments, display, format!("{}/{}", pointer, i), out);
                display.pop();
            }
        }
        (Value::Object(map), Some((head, rest))) => {
            if let Some(child) = map.get(*head) {
                display.push((*head).to_string());
                collect_entries(
                    child,
                    rest,
                    display,
                    format!("{}/{}", pointer, escape_pointer(head)),
                    out,
                );
                display.pop();
            }
        }
        (_, Some(_)) => {}
    }
}

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(env: Value) -> Value {
        json!({
            "manifest_version": "subsquid.io/v0.1",
            "name": "test",
            "version": 1,
            "deploy": {
                "env": env,
                "processor": [{ "name": "processor" }]
            }
        })
    }

    #[test]
    fn test_entries_fan_out_over_arrays() {
        let doc = json!({
            "deploy": {
                "env": { "A": "a" },
                "processor": [
                    { "env": { "B": "b" } },
                    { "name": "no-env" },
                    { "env": { "C": "c" } }
                ]
            }
        });
        let paths: Vec<String> = EnvResolver::default()
            .entries(&doc)
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(
            paths,
            vec![
                "deploy.env.A",
                "deploy.processor.[0].env.B",
                "deploy.processor.[2].env.C"
            ]
        );
    }

    #[test]
    fn test_entries_single_processor_object() {
        let doc = json!({"deploy": {"processor": {"env": {"X": "x"}}}});
        let entries = EnvResolver::default().entries(&doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "deploy.processor.env.X");
        assert_eq!(entries[0].pointer, "/deploy/processor/env/X");
    }

    #[test]
    fn test_pointer_escaping() {
        let doc = json!({"deploy": {"env": {"a/b~c": "v"}}});
        let entries = EnvResolver::default().entries(&doc);
        assert_eq!(entries[0].pointer, "/deploy/env/a~1b~0c");
    }

    #[test]
    fn test_resolve_substitutes_and_leaves_input_untouched() {
        let doc = manifest(json!({ "foo": "${{foo}}", "bar": "bar" }));
        let resolved = EnvResolver::default()
            .resolve(&doc, &json!({"foo": "value1"}))
            .unwrap();
        assert_eq!(resolved["deploy"]["env"]["foo"], "value1");
        assert_eq!(resolved["deploy"]["env"]["bar"], "bar");
        assert_eq!(doc["deploy"]["env"]["foo"], "${{foo}}");
    }

    #[test]
    fn test_resolve_keeps_unclosed_spans() {
        let doc = manifest(json!({ "baz": "${{baz" }));
        let resolved = EnvResolver::default().resolve(&doc, &json!({})).unwrap();
        assert_eq!(resolved["deploy"]["env"]["baz"], "${{baz");
    }

    #[test]
    fn test_resolve_converts_scalars_to_strings() {
        let doc = manifest(json!({ "N": 5, "B": true }));
        let resolved = EnvResolver::default().resolve(&doc, &json!({})).unwrap();
        assert_eq!(resolved["deploy"]["env"]["N"], "5");
        assert_eq!(resolved["deploy"]["env"]["B"], "true");
    }

    #[test]
    fn test_resolve_reports_missing_variable() {
        let doc = manifest(json!({ "foo": "${{foo}}", "baz": "${{baz}}" }));
        let err = EnvResolver::default()
            .resolve(&doc, &json!({"foo": "value1"}))
            .unwrap_err();
        assert_eq!(
            err,
            ManifestError::Evaluation(vec![
                "Manifest env variable \"deploy.env.baz\" can not be mapped to \"${{baz}}\": \"baz\" is not defined".to_string()
            ])
        );
    }

    #[test]
    fn test_resolve_collects_all_failures() {
        let doc = json!({
            "deploy": {
                "env": { "A": "${{a.}} ${{b}}", "OBJ": {} },
                "processor": [{ "env": { "P": "${{p}}" } }]
            }
        });
        let err = EnvResolver::default().resolve(&doc, &json!({})).unwrap_err();
        assert_eq!(err.details().len(), 4);
        assert!(err.details()[0].contains("Unexpected token '.' [4]"));
        assert!(err.details()[1].contains("\"b\" is not defined"));
        assert_eq!(err.details()[2], "\"deploy.env.OBJ\" must be a string");
        assert!(err.details()[3].starts_with("Manifest env variable \"deploy.processor.[0].env.P\""));
    }

    #[test]
    fn test_preserve_policy_keeps_raw_values() {
        let resolver = EnvResolver::new(
            ResolverConfig::default().with_policy(InvalidValuePolicy::Preserve),
        );
        let doc = manifest(json!({ "ok": "${{ok}}", "bad": "x-${{missing}}" }));
        let resolved = resolver.resolve(&doc, &json!({"ok": "yes"})).unwrap();
        assert_eq!(resolved["deploy"]["env"]["ok"], "yes");
        assert_eq!(resolved["deploy"]["env"]["bad"], "x-${{missing}}");
    }

    #[test]
    fn test_variables_under_prefix() {
        let doc = json!({
            "deploy": {
                "env": { "GLOBAL": "${{secrets.GLOBAL}}" },
                "processor": { "env": { "PROCESSOR": "${{secrets.PROCESSOR}}" } },
                "api": { "env": { "API": "${{secrets.API}}" } },
                "init": { "env": {
                    "INIT": "${{secrets.INIT}}",
                    "MISSING": "${{rpc.INIT_DOWN}}",
                    "AGAIN": "${{secrets.GLOBAL}}"
                } }
            }
        });
        let mut vars = EnvResolver::default().variables(&doc, &["secrets"]).unwrap();
        vars.sort();
        assert_eq!(vars, vec!["API", "GLOBAL", "INIT", "PROCESSOR"]);
    }

    #[test]
    fn test_variables_report_malformed_spans() {
        let doc = manifest(json!({ "foo": "${{foo.}}" }));
        let err = EnvResolver::default()
            .variables(&doc, &["secrets"])
            .unwrap_err();
        assert!(matches!(err, ManifestError::Validation(_)));
    }

    #[test]
    fn test_error_formatting() {
        let err = ManifestError::Validation(vec!["line1".to_string(), "line2".to_string()]);
        assert_eq!(
            err.to_string(),
            "Validation error occurred:\n  1) line1\n  2) line2"
        );
    }
}
