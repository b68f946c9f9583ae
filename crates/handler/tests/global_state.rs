//! Tests that mutate the process-wide configuration and adapter registry.
//!
//! They live in their own binary and take a shared lock each, so the
//! parallel test harness cannot interleave global states.

use async_trait::async_trait;
use micro_handler::validate::{clear_adapters, detect_validator, register_adapter, ValidatorAdapter};
use micro_handler::{configure, get_config, handler_fn, reset_config, BoxError, ConfigPatch, Context, Handler, PipelineError};
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};

static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    GLOBAL_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Greedy;

#[async_trait]
impl ValidatorAdapter for Greedy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn detect(&self, _schema: &Value) -> bool {
        true
    }

    async fn parse(&self, _schema: &Value, data: Value) -> Result<Value, BoxError> {
        Ok(data)
    }
}

#[test]
fn custom_adapters_pre_empt_builtins() {
    let _guard = lock();
    clear_adapters();

    // a schema a built-in would also claim
    let schema = json!({"type": "string"});
    assert_eq!(detect_validator(&schema).unwrap().name(), "json-schema");

    register_adapter(Greedy);
    assert_eq!(detect_validator(&schema).unwrap().name(), "greedy");
    // greedy claims anything, even schemas no built-in matches
    assert_eq!(detect_validator(&json!(42)).unwrap().name(), "greedy");

    clear_adapters();
    assert_eq!(detect_validator(&schema).unwrap().name(), "json-schema");
    assert!(detect_validator(&json!(42)).is_none());
}

#[test]
fn registration_order_is_lookup_order() {
    let _guard = lock();
    clear_adapters();

    struct Named(&'static str);

    #[async_trait]
    impl ValidatorAdapter for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn detect(&self, _schema: &Value) -> bool {
            true
        }

        async fn parse(&self, _schema: &Value, data: Value) -> Result<Value, BoxError> {
            Ok(data)
        }
    }

    register_adapter(Named("first"));
    register_adapter(Named("second"));
    assert_eq!(detect_validator(&json!({})).unwrap().name(), "first");

    clear_adapters();
}

#[tokio::test]
async fn global_config_changes_affect_already_built_handlers() {
    let _guard = lock();
    reset_config();

    async fn echo(input: Value, _ctx: Context) -> Result<Value, PipelineError> {
        Ok(input)
    }

    // built while validation is on
    let handler = Handler::new().input(json!({"n": "required|integer"})).handle(handler_fn(echo));

    let invalid = json!({"n": "not a number"});
    let err = handler.execute(invalid.clone()).await.unwrap_err();
    assert!(err.is_validation());

    // the gate is re-read on every execute, so flipping it now takes effect
    configure(ConfigPatch::new().validate_input(false));
    let result = handler.execute(invalid.clone()).await.unwrap();
    assert_eq!(result, invalid);

    reset_config();
    let err = handler.execute(invalid).await.unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn get_config_returns_a_defensive_copy() {
    let _guard = lock();
    reset_config();

    let mut copy = get_config();
    copy.validate_input = false;

    assert!(get_config().validate_input);

    reset_config();
}

#[test]
fn configure_merges_partial_patches() {
    let _guard = lock();
    reset_config();

    let defaults = get_config();

    configure(ConfigPatch::new().validate_output(!defaults.validate_output));
    let current = get_config();
    assert_eq!(current.validate_input, defaults.validate_input);
    assert_eq!(current.validate_output, !defaults.validate_output);

    reset_config();
    assert_eq!(get_config(), defaults);
}
