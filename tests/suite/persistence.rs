//! Provider choices survive a restart through the config file.

use std::fs;

use chorus_config::{ChorusConfig, ResolvedConfig};
use chorus_engine::{App, ConfigFileStore, ManualClock};
use chorus_host::RecordingHost;
use tempfile::tempdir;

#[test]
fn switched_provider_is_restored_on_next_start() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "# user settings\n[panes]\ncount = 2\n\n[recovery]\nmax_retries = 4\n",
    )
    .unwrap();

    let config = ChorusConfig::load_from(&path).unwrap().unwrap().resolve();
    let mut app = App::new(RecordingHost::new(), config, Box::new(ManualClock::new()))
        .with_preference_store(Box::new(ConfigFileStore::new(&path)));
    assert_eq!(app.initialize().current_pane_count, 2);
    assert!(app.update_pane_provider(1, "perplexity").success);

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("# user settings"));
    assert!(written.contains("max_retries = 4"));

    let restarted = ChorusConfig::load_from(&path).unwrap().unwrap().resolve();
    assert_eq!(restarted.pane_count.get(), 2);
    assert_eq!(restarted.recovery.max_retries, 4);
    assert_eq!(restarted.default_providers[0].as_str(), "chatgpt");
    assert_eq!(restarted.default_providers[1].as_str(), "perplexity");

    let mut app = App::new(RecordingHost::new(), restarted, Box::new(ManualClock::new()));
    app.initialize();
    assert_eq!(app.panes().pane(1).unwrap().provider_key.as_str(), "perplexity");
}

#[test]
fn rejected_switch_leaves_file_alone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut app = App::new(
        RecordingHost::new(),
        ResolvedConfig::default(),
        Box::new(ManualClock::new()),
    )
    .with_preference_store(Box::new(ConfigFileStore::new(&path)));
    app.initialize();

    assert!(!app.update_pane_provider(0, "bard").success);
    assert!(!path.exists());

    assert!(app.update_pane_provider(0, "claude").success);
    assert!(path.exists());
}
