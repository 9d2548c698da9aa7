//! Integration tests for the process-wide registry.
//!
//! The process-wide registry can be installed once per process, so every
//! check lives in a single test to keep the ordering deterministic.

use std::sync::Arc;

use namelog::{Config, LevelSet, LogError, LoggerOptions, MemorySink, Registry, levels};

#[test]
fn process_wide_registry_lifecycle() {
    let mut config = Config::default();
    config.apply_directives("db=error").unwrap();
    let installed = Registry::with_config(LevelSet::default(), &config).unwrap();
    namelog::init(installed).unwrap();

    // A second installation is refused and keeps the first registry.
    assert_eq!(
        namelog::init(Registry::new()),
        Err(LogError::AlreadyInitialized)
    );
    assert_eq!(namelog::init_from_env(), Err(LogError::AlreadyInitialized));

    // The free functions all reach the installed registry.
    let sink = Arc::new(MemorySink::new());
    let db = namelog::create("db", LoggerOptions::new().stream(sink.clone()));
    assert_eq!(db.threshold(), levels::ERROR);
    assert!(Arc::ptr_eq(&namelog::find("db").unwrap(), &db));
    assert!(Arc::ptr_eq(&namelog::registry().require("db").unwrap(), &db));
    assert!(namelog::find("missing").is_none());

    let global = namelog::global();
    assert_eq!(global.name(), namelog::GLOBAL);
    assert!(Arc::ptr_eq(&global, &namelog::registry().global()));

    // Global state set through one logger is seen by every other.
    db.disable();
    global.enable_all();
    db.error(["forced"]);
    assert_eq!(sink.take().len(), 1);

    global.only();
    db.error(["silenced"]);
    assert!(sink.is_empty());
    global.all();
    global.disable_all();
}
