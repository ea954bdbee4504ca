use super::*;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("lili-console-{}", uuid::Uuid::new_v4()))
        .join(name)
}

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_get_missing_is_none() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get("accessToken"), None);
}

#[test]
fn memory_set_then_get() {
    let storage = MemoryStorage::new();
    storage.set("accessToken", "A1", Duration::days(7));
    assert_eq!(storage.get("accessToken").as_deref(), Some("A1"));
}

#[test]
fn memory_set_overwrites() {
    let storage = MemoryStorage::new();
    storage.set("uuid", "one", Duration::days(1));
    storage.set("uuid", "two", Duration::days(1));
    assert_eq!(storage.get("uuid").as_deref(), Some("two"));
}

#[test]
fn memory_expired_entry_reads_as_none() {
    let storage = MemoryStorage::new();
    storage.set("uuid", "stale", Duration::seconds(-1));
    assert_eq!(storage.get("uuid"), None);
}

#[test]
fn memory_remove_is_idempotent() {
    let storage = MemoryStorage::new();
    storage.set("refreshToken", "R1", Duration::days(7));
    storage.remove("refreshToken");
    storage.remove("refreshToken");
    assert_eq!(storage.get("refreshToken"), None);
}

// =============================================================================
// FileStorage
// =============================================================================

#[test]
fn file_missing_starts_empty() {
    let storage = FileStorage::open(temp_path("session.json"));
    assert_eq!(storage.get("accessToken"), None);
}

#[test]
fn file_survives_reopen() {
    let path = temp_path("session.json");
    {
        let storage = FileStorage::open(&path);
        storage.set("accessToken", "A1", Duration::days(7));
        storage.set("uuid", "device-1", Duration::days(1));
    }
    let reopened = FileStorage::open(&path);
    assert_eq!(reopened.get("accessToken").as_deref(), Some("A1"));
    assert_eq!(reopened.get("uuid").as_deref(), Some("device-1"));
}

#[test]
fn file_remove_persists() {
    let path = temp_path("session.json");
    let storage = FileStorage::open(&path);
    storage.set("accessToken", "A1", Duration::days(7));
    storage.remove("accessToken");

    let reopened = FileStorage::open(&path);
    assert_eq!(reopened.get("accessToken"), None);
}

#[test]
fn file_expired_entry_is_pruned_on_read() {
    let path = temp_path("session.json");
    let storage = FileStorage::open(&path);
    storage.set("uuid", "stale", Duration::seconds(-5));
    assert_eq!(storage.get("uuid"), None);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("stale"));
}

#[test]
fn file_corrupt_contents_start_empty() {
    let path = temp_path("session.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{not json").unwrap();

    let storage = FileStorage::open(&path);
    assert_eq!(storage.get("accessToken"), None);
    storage.set("accessToken", "A2", Duration::days(7));
    assert_eq!(FileStorage::open(&path).get("accessToken").as_deref(), Some("A2"));
}

#[test]
fn file_values_are_stored_as_plain_strings() {
    let path = temp_path("session.json");
    let storage = FileStorage::open(&path);
    storage.set("refreshToken", "R1", Duration::days(7));

    let raw = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["refreshToken"]["value"], "R1");
    assert!(parsed["refreshToken"]["expires_at"].is_i64());
}

#[test]
fn file_rewrite_leaves_no_temp_file() {
    let path = temp_path("session.json");
    let storage = FileStorage::open(&path);
    storage.set("accessToken", "A1", Duration::days(7));
    storage.set("accessToken", "A2", Duration::days(7));

    let names: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("session.json")]);
    assert_eq!(FileStorage::open(&path).get("accessToken").as_deref(), Some("A2"));
}

#[cfg(unix)]
#[test]
fn file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let path = temp_path("session.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{}").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let storage = FileStorage::open(&path);
    storage.set("accessToken", "A1", Duration::days(7));

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn leftover_temp_file_does_not_block_writes() {
    let path = temp_path("session.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path.with_file_name("session.json.tmp"), "partial").unwrap();

    let storage = FileStorage::open(&path);
    storage.set("refreshToken", "R1", Duration::days(7));

    assert_eq!(FileStorage::open(&path).get("refreshToken").as_deref(), Some("R1"));
    assert!(!path.with_file_name("session.json.tmp").exists());
}
