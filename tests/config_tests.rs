use snapiter::prelude::*;

// Only test in this binary that touches the process environment.
#[test]
fn reads_overrides_from_environment() {
    std::env::set_var("SNAPITER_CHECKPOINT_DIR", "/var/lib/snapiter");
    std::env::set_var("SNAPITER_CHECKPOINT_URI", "memory://");
    std::env::set_var("SNAPITER_CODEC", " LZ4 ");
    std::env::set_var("SNAPITER_MAX_SNAPSHOT_BYTES", "4096");
    std::env::set_var("SNAPITER_LINE_BUFFER_BYTES", "not-a-number");

    let cfg = SnapiterConfig::from_env();
    assert_eq!(cfg.checkpoint_dir, "/var/lib/snapiter");
    assert_eq!(cfg.codec, "lz4");
    assert_eq!(cfg.max_snapshot_bytes, 4096);
    assert_eq!(cfg.line_buffer_bytes, SnapiterConfig::default().line_buffer_bytes);
    assert_eq!(cfg.storage_config().scheme(), Some("memory"));

    for key in [
        "SNAPITER_CHECKPOINT_DIR",
        "SNAPITER_CHECKPOINT_URI",
        "SNAPITER_CODEC",
        "SNAPITER_MAX_SNAPSHOT_BYTES",
        "SNAPITER_LINE_BUFFER_BYTES",
    ] {
        std::env::remove_var(key);
    }
    let cfg = SnapiterConfig::from_env();
    assert_eq!(cfg.checkpoint_dir, SnapiterConfig::default().checkpoint_dir);
    assert_eq!(cfg.checkpoint_uri, None);
}
