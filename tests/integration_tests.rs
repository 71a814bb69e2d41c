/*
 * Integration tests for N2K Displays
 *
 * These tests drive a full bridge through an in-memory host and check
 * the sync behavior end to end.
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mockall::mock;
use serde_json::{json, Value};
use serial_test::serial;

use n2k_displays::protocol::{
    Delta, N2kCommand, PathMeta, PathValue, SubscribeCommand, Update, SELF_CONTEXT,
};
use n2k_displays::{
    constants::plugin, load_settings, BridgeConfig, BridgeSettings, DisplayBridge, DisplayError,
    Host, MemoryHost, SyncOutcome, Teardown,
};

// Test utilities
fn config_from(settings: &str) -> BridgeConfig {
    BridgeSettings::from_json(settings).unwrap().resolve().unwrap()
}

fn mapped_config() -> BridgeConfig {
    config_from(r#"{"groupMappings":[{"raymarineGroup":"helm1","simradGroup":"group2"}]}"#)
}

fn started(config: BridgeConfig) -> DisplayBridge<MemoryHost> {
    let mut bridge = DisplayBridge::new(MemoryHost::new(), config).unwrap();
    bridge.start();
    bridge.host_mut().drain_events();
    bridge
}

fn bus_delta(source: &str, path: &str, value: Value) -> Delta {
    Delta {
        context: Some(SELF_CONTEXT.to_string()),
        updates: vec![Update {
            source: Some(source.to_string()),
            values: vec![PathValue::new(path, value)],
            meta: Vec::new(),
        }],
    }
}

/// Feed every delta the bridge published back into it, as the host would
fn echo_back(bridge: &mut DisplayBridge<MemoryHost>) -> Vec<SyncOutcome> {
    let deltas: Vec<Delta> = bridge
        .host_mut()
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            n2k_displays::HostEvent::Delta(delta) => Some(delta),
            _ => None,
        })
        .collect();
    deltas.iter().flat_map(|d| bridge.handle_delta(d)).collect()
}

// ============================================================================
// Feedback loops and self-echo
// ============================================================================

#[test]
fn test_repeated_writes_emit_bounded_commands() {
    let mut bridge = started(mapped_config());

    for (i, value) in [0.1, 0.4, 0.9, 0.0].iter().enumerate() {
        let result = bridge.handle_put(
            SELF_CONTEXT,
            "electrical.displays.raymarine.helm1.brightness",
            &json!(value),
        );
        assert!(result.is_success());
        // One direct command plus one mirrored command per write
        assert_eq!(bridge.host().commands().len(), 2 * (i + 1));
    }

    let echoes = echo_back(&mut bridge);
    assert!(!echoes.is_empty());
    assert!(echoes.iter().all(|o| *o == SyncOutcome::SelfEcho));
    assert!(bridge.host().commands().is_empty());
}

#[test]
fn test_self_sourced_update_never_mirrors() {
    let mut bridge = started(mapped_config());

    let outcomes = bridge.handle_delta(&bus_delta(
        plugin::ID,
        "electrical.displays.navico.group2.nightMode.state",
        json!(1),
    ));
    assert_eq!(outcomes, vec![SyncOutcome::SelfEcho]);
    assert!(bridge.host().commands().is_empty());
    assert!(bridge.host().events().is_empty());
}

#[test]
fn test_bus_change_mirrors_once_and_settles() {
    let mut bridge = started(mapped_config());

    let outcomes = bridge.handle_delta(&bus_delta(
        "can0.17",
        "electrical.displays.navico.group2.nightMode.state",
        json!(1),
    ));
    assert!(matches!(outcomes[..], [SyncOutcome::Mirrored(_)]));
    // Raymarine night mode is applied as the night palette
    let commands: Vec<N2kCommand> = bridge.host().commands().into_iter().cloned().collect();
    assert_eq!(commands.len(), 1);
    let fields = serde_json::to_value(&commands[0]).unwrap()["fields"].clone();
    assert_eq!(fields["Color"], "Red/Black");
    assert_eq!(fields["Group"], "Helm 1");

    let echoes = echo_back(&mut bridge);
    assert!(echoes.iter().all(|o| *o == SyncOutcome::SelfEcho));
}

#[test]
fn test_device_confirmations_do_not_ping_pong() {
    let mut bridge = started(mapped_config());

    bridge.handle_put(SELF_CONTEXT, "electrical.displays.raymarine.helm1.brightness", &json!(0.5));
    assert_eq!(bridge.host().commands().len(), 2);

    // Both displays report the commanded level back on the bus
    for _ in 0..6 {
        for path in [
            "electrical.displays.raymarine.helm1.brightness",
            "electrical.displays.navico.group2.brightness",
        ] {
            let outcomes = bridge.handle_delta(&bus_delta("can0.20", path, json!(0.5)));
            assert!(matches!(outcomes[..], [SyncOutcome::InSync(_)]), "{}", path);
        }
        assert_eq!(bridge.host().commands().len(), 2);
    }
}

#[test]
fn test_night_mode_confirmations_settle() {
    let mut bridge = started(mapped_config());

    bridge.handle_put(SELF_CONTEXT, "electrical.displays.raymarine.helm1.nightMode.state", &json!(1));
    assert_eq!(bridge.host().commands().len(), 2);

    for _ in 0..3 {
        bridge.handle_delta(&bus_delta("can0.20", "electrical.displays.raymarine.helm1.color", json!("red/black")));
        bridge.handle_delta(&bus_delta("can0.21", "electrical.displays.navico.group2.nightMode.state", json!(1)));
    }
    assert_eq!(bridge.host().commands().len(), 2);
    assert_eq!(
        bridge.read("electrical.displays.raymarine.helm1.nightMode.state"),
        Some(json!(1))
    );
}

// ============================================================================
// Night mode derivation
// ============================================================================

#[test]
fn test_night_mode_follows_color() {
    let mut bridge = started(mapped_config());
    let state = "electrical.displays.raymarine.helm1.nightMode.state";

    bridge.handle_put(SELF_CONTEXT, "electrical.displays.raymarine.helm1.color", &json!("red/black"));
    assert_eq!(bridge.read(state), Some(json!(1)));
    assert_eq!(
        bridge.read("electrical.displays.navico.group2.nightMode.state"),
        Some(json!(1))
    );

    bridge.handle_put(SELF_CONTEXT, "electrical.displays.raymarine.helm1.color", &json!("day1"));
    assert_eq!(bridge.read(state), Some(json!(0)));

    // A day palette other than the configured one is still day
    bridge.handle_delta(&bus_delta("can0.5", "electrical.displays.raymarine.helm1.color", json!("inverse")));
    assert_eq!(bridge.read(state), Some(json!(0)));
}

#[test]
fn test_configured_night_color_drives_derivation() {
    let mut bridge = started(config_from(r#"{"raymarineNightColor":"inverse"}"#));
    let state = "electrical.displays.raymarine.cockpit.nightMode.state";

    let outcomes = bridge.handle_delta(&bus_delta(
        "can0.5",
        "electrical.displays.raymarine.cockpit.color",
        json!("inverse"),
    ));
    assert_eq!(outcomes, vec![SyncOutcome::Derived]);
    assert_eq!(bridge.read(state), Some(json!(1)));

    bridge.handle_delta(&bus_delta("can0.5", "electrical.displays.raymarine.cockpit.color", json!("red/black")));
    assert_eq!(bridge.read(state), Some(json!(0)));
}

// ============================================================================
// Mirroring
// ============================================================================

#[test]
fn test_brightness_mirrors_both_ways() {
    let mut bridge = started(mapped_config());

    bridge.handle_put(SELF_CONTEXT, "electrical.displays.raymarine.helm1.brightness", &json!(0.5));
    assert_eq!(
        bridge.read("electrical.displays.navico.group2.brightness"),
        Some(json!(0.5))
    );

    bridge.handle_put(SELF_CONTEXT, "electrical.displays.navico.group2.brightness", &json!(0.3));
    assert_eq!(
        bridge.read("electrical.displays.raymarine.helm1.brightness"),
        Some(json!(0.3))
    );

    let direct = serde_json::to_value(bridge.host().commands()[0]).unwrap();
    assert_eq!(direct["fields"]["Group"], "Helm 1");
    let mirrored = serde_json::to_value(bridge.host().commands()[1]).unwrap();
    assert_eq!(mirrored["fields"]["Key"], "Backlight level");
    assert_eq!(mirrored["fields"]["Display Group"], "Group 2");
}

#[test]
fn test_raymarine_night_mode_put_mirrors_to_navico() {
    let mut bridge = started(mapped_config());

    let result = bridge.handle_put(
        SELF_CONTEXT,
        "electrical.displays.raymarine.helm1.nightMode.state",
        &json!(1),
    );
    assert!(result.is_success());
    assert_eq!(bridge.host().commands().len(), 2);
    assert_eq!(
        bridge.read("electrical.displays.navico.group2.nightMode.state"),
        Some(json!(1))
    );
    assert_eq!(
        bridge.read("electrical.displays.raymarine.helm1.color"),
        Some(json!("red/black"))
    );

    let mirrored = serde_json::to_value(bridge.host().commands()[1]).unwrap();
    assert_eq!(mirrored["fields"]["Key"], "Night mode");
    assert_eq!(mirrored["fields"]["Value"], 4);
}

#[test]
fn test_navico_night_mode_put_mirrors_to_raymarine() {
    let mut bridge = started(mapped_config());

    let result = bridge.handle_put(
        SELF_CONTEXT,
        "electrical.displays.navico.group2.nightMode.state",
        &json!(0),
    );
    assert!(result.is_success());
    assert_eq!(bridge.host().commands().len(), 2);
    assert_eq!(
        bridge.read("electrical.displays.raymarine.helm1.nightMode.state"),
        Some(json!(0))
    );
    assert_eq!(
        bridge.read("electrical.displays.raymarine.helm1.color"),
        Some(json!("day1"))
    );

    let mirrored = serde_json::to_value(bridge.host().commands()[1]).unwrap();
    assert_eq!(mirrored["fields"]["Command"], "Color");
    assert_eq!(mirrored["fields"]["Color"], "Day 1");
    assert_eq!(mirrored["fields"]["Group"], "Helm 1");
}

#[test]
fn test_unmapped_group_stays_isolated() {
    let mut bridge = started(mapped_config());

    bridge.handle_put(SELF_CONTEXT, "electrical.displays.raymarine.flybridge.brightness", &json!(0.8));
    assert_eq!(bridge.host().commands().len(), 1);

    let outcomes = bridge.handle_delta(&bus_delta(
        "can0.9",
        "electrical.displays.raymarine.flybridge.brightness",
        json!(0.2),
    ));
    assert_eq!(outcomes, vec![SyncOutcome::Unmapped]);
    assert_eq!(bridge.host().commands().len(), 1);
}

#[test]
fn test_night_color_targets_default_group() {
    let mut bridge = started(mapped_config());

    bridge.handle_put(SELF_CONTEXT, "electrical.displays.navico.group2.nightModeColor", &json!("white"));
    let commands = bridge.host().commands();
    assert_eq!(commands.len(), 1);
    let value = serde_json::to_value(commands[0]).unwrap();
    assert_eq!(value["fields"]["Display Group"], "Default");
    assert_eq!(value["fields"]["Value"], 3);
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_out_of_range_brightness_has_no_effect() {
    let mut bridge = started(mapped_config());

    let result = bridge.handle_put(
        SELF_CONTEXT,
        "electrical.displays.raymarine.helm1.brightness",
        &json!(1.5),
    );
    assert_eq!(result.status_code, 400);
    assert!(result.message.is_some());
    assert!(bridge.host().commands().is_empty());
    assert!(bridge.host().published().is_empty());
    assert_eq!(
        bridge.read("electrical.displays.raymarine.helm1.brightness"),
        Some(json!(0.0))
    );
}

#[test]
fn test_unknown_keys_are_rejected() {
    let mut bridge = started(mapped_config());

    for (path, value) in [
        ("electrical.displays.raymarine.helm1.color", json!("purple")),
        ("electrical.displays.navico.group2.nightModeColor", json!("orange")),
        ("electrical.displays.navico.group2.nightMode.state", json!(2)),
        ("electrical.displays.raymarine.bridge.brightness", json!(0.5)),
    ] {
        let result = bridge.handle_put(SELF_CONTEXT, path, &value);
        assert_eq!(result.status_code, 400, "{} = {}", path, value);
    }
    assert!(bridge.host().events().is_empty());
}

#[test]
fn test_disabled_group_is_invisible() {
    let config = config_from(r#"{"raymarineGroups":{"mast":false}}"#);
    let mut bridge = DisplayBridge::new(MemoryHost::new(), config).unwrap();
    bridge.start();

    let mast = "electrical.displays.raymarine.mast.brightness";
    assert!(!bridge.host().is_registered(mast));
    assert!(bridge.host().is_registered("electrical.displays.raymarine.helm1.brightness"));
    bridge.host_mut().drain_events();

    assert_eq!(bridge.handle_put(SELF_CONTEXT, mast, &json!(0.5)).status_code, 400);
    let outcomes = bridge.handle_delta(&bus_delta("can0.4", mast, json!(0.5)));
    assert_eq!(outcomes, vec![SyncOutcome::NotObserved]);
    assert!(bridge.host().events().is_empty());
    assert_eq!(bridge.read(mast), None);
}

#[test]
fn test_duplicate_mappings_rejected_at_load() {
    let result = BridgeSettings::from_json(
        r#"{"groupMappings":[
            {"raymarineGroup":"helm1","simradGroup":"group2"},
            {"raymarineGroup":"helm2","simradGroup":"group2"}
        ]}"#,
    )
    .unwrap()
    .resolve();
    assert!(matches!(result, Err(DisplayError::DuplicateMapping { .. })));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_stop_releases_each_subscription_once() {
    let mut bridge = started(mapped_config());
    assert_eq!(bridge.host().active_subscriptions(), 2);

    bridge.stop();
    bridge.stop();
    assert_eq!(bridge.host().teardown_count(), 2);
    assert_eq!(bridge.host().active_subscriptions(), 0);

    // Deltas after stop are not processed
    let outcomes = bridge.handle_delta(&bus_delta(
        "can0.1",
        "electrical.displays.raymarine.helm1.brightness",
        json!(0.4),
    ));
    assert!(outcomes.is_empty());
}

mock! {
    pub TestHost {}

    impl Host for TestHost {
        fn register_put_handler(&mut self, context: &str, path: &str);
        fn publish(&mut self, source: &str, values: Vec<PathValue>);
        fn publish_meta(&mut self, source: &str, meta: Vec<PathMeta>);
        fn emit(&mut self, event: &str, command: N2kCommand);
        fn subscribe(&mut self, command: SubscribeCommand) -> n2k_displays::Result<Teardown>;
        fn set_plugin_error(&mut self, message: &str);
    }
}

#[test]
fn test_failed_subscription_reported_and_others_released() {
    let released = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&released);

    let mut host = MockTestHost::new();
    host.expect_register_put_handler().returning(|_, _| ());
    host.expect_publish().returning(|_, _| ());
    host.expect_publish_meta().returning(|_, _| ());
    host.expect_subscribe()
        .withf(|c| c.subscribe[0].path == "electrical.displays.raymarine.*")
        .times(1)
        .returning(move |_| {
            let counter = Arc::clone(&counter);
            Ok(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
        });
    host.expect_subscribe()
        .withf(|c| c.subscribe[0].path == "electrical.displays.navico.*")
        .times(1)
        .returning(|_| Err(DisplayError::Subscription("malformed command".into())));
    host.expect_set_plugin_error().times(1).returning(|_| ());

    let mut bridge = DisplayBridge::new(host, mapped_config()).unwrap();
    bridge.start();
    bridge.stop();
    drop(bridge);

    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_subscription_error_callback_reaches_sink() {
    let mut bridge = started(BridgeConfig::default());
    bridge.on_subscription_error("connection reset");
    assert_eq!(
        bridge.host().plugin_errors(),
        ["Subscription failed: connection reset".to_string()]
    );
}

// ============================================================================
// Settings discovery
// ============================================================================

#[test]
#[serial]
fn test_default_settings_location() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    // No file yet: defaults
    let settings = load_settings(None).unwrap();
    assert_eq!(settings, BridgeSettings::default());

    let settings_dir = dir.path().join("n2k-displays");
    std::fs::create_dir_all(&settings_dir).unwrap();
    std::fs::write(
        settings_dir.join("settings.json"),
        r#"{"raymarineDayColor":"day2","navicoGroups":{"default":false}}"#,
    )
    .unwrap();

    let config = load_settings(None).unwrap().resolve().unwrap();
    assert_eq!(config.day_color.key(), "day2");
    assert_eq!(config.registry.enabled_groups(n2k_displays::Vendor::Navico).len(), 6);

    std::env::remove_var("XDG_CONFIG_HOME");
}

#[test]
fn test_oversized_settings_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, " ".repeat(70 * 1024)).unwrap();

    assert!(matches!(
        load_settings(Some(&path)),
        Err(DisplayError::FileTooLarge { .. })
    ));
}
