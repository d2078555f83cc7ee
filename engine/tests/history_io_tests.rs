use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use engine::History;

fn unique_temp_json_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "engine_test_history_{tag}_{}_{nanos}.json",
        std::process::id()
    ))
}

#[test]
fn history_save_and_load_roundtrips_entries_and_cursor() {
    let mut h = History::new(0i32, 8);
    h.record(1);
    h.record(2);

    // Rewind and branch so the truncated future must not come back.
    h.rewind(1);
    h.record(99);
    h.rewind(1);

    let out = unique_temp_json_path("roundtrip");
    h.save_json_file(&out).expect("save history json");

    let loaded = History::<i32>::load_json_file(&out).expect("load history json");
    assert_eq!(loaded.frame(), 1);
    assert_eq!(loaded.current(), &1);
    assert_eq!(loaded.iter().copied().collect::<Vec<_>>(), vec![0, 1, 99]);
    assert_eq!(loaded.capacity(), 8);

    let _ = fs::remove_file(out);
}

#[test]
fn history_save_creates_parent_directories() {
    let dir = unique_temp_json_path("nested").with_extension("");
    let out = dir.join("deeper").join("history.json");

    History::new("start".to_string(), 2)
        .save_json_file(&out)
        .expect("save into nested dir");
    assert!(out.exists());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn loading_garbage_is_invalid_data() {
    let out = unique_temp_json_path("garbage");
    fs::write(&out, b"not json").expect("write garbage");

    let err = History::<i32>::load_json_file(&out).expect_err("garbage must not parse");
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

    let _ = fs::remove_file(out);
}
