use pretty_assertions::assert_eq;
use tenantlock_storage::Database;
use tenantlock_tenant::{ConfigStore, TenantError, BASE_PLATFORM_DOMAIN};

fn store() -> ConfigStore {
    ConfigStore::new(Database::open_in_memory().unwrap())
}

#[test]
fn get_missing_key_is_not_found() {
    let config = store();
    let err = config.get("MISSING").unwrap_err();
    assert!(matches!(err, TenantError::ConfigNotFound(k) if k == "MISSING"));
    assert_eq!(config.entry("MISSING").unwrap(), None);
}

#[test]
fn set_then_get() {
    let config = store();
    let entry = config
        .set(BASE_PLATFORM_DOMAIN, "example.com", Some("base domain"))
        .unwrap();
    assert_eq!(entry.value, "example.com");
    assert_eq!(entry.description.as_deref(), Some("base domain"));
    assert_eq!(config.get(BASE_PLATFORM_DOMAIN).unwrap(), "example.com");
}

#[test]
fn set_upserts_and_keeps_description_when_omitted() {
    let config = store();
    let first = config.set("SUPPORT_EMAIL", "a@x.io", Some("support inbox")).unwrap();
    let second = config.set("SUPPORT_EMAIL", "b@x.io", None).unwrap();

    assert_eq!(second.value, "b@x.io");
    assert_eq!(second.description.as_deref(), Some("support inbox"));
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);

    let third = config.set("SUPPORT_EMAIL", "b@x.io", Some("helpdesk")).unwrap();
    assert_eq!(third.description.as_deref(), Some("helpdesk"));
    assert_eq!(config.list().unwrap().len(), 1);
}

#[test]
fn blank_key_is_rejected() {
    let config = store();
    for key in ["", "  "] {
        let err = config.set(key, "v", None).unwrap_err();
        assert!(matches!(err, TenantError::InvalidInput(_)));
    }
    assert!(config.list().unwrap().is_empty());
}

#[test]
fn seed_default_never_overwrites() {
    let config = store();
    assert!(config.seed_default(BASE_PLATFORM_DOMAIN, "localhost:5173", None).unwrap());
    config.set(BASE_PLATFORM_DOMAIN, "example.com", None).unwrap();
    assert!(!config.seed_default(BASE_PLATFORM_DOMAIN, "localhost:5173", None).unwrap());
    assert_eq!(config.get(BASE_PLATFORM_DOMAIN).unwrap(), "example.com");
}

#[test]
fn list_is_ordered_by_key() {
    let config = store();
    config.set("ZETA", "1", None).unwrap();
    config.set("ALPHA", "2", None).unwrap();
    let keys: Vec<String> = config.list().unwrap().into_iter().map(|e| e.key).collect();
    assert_eq!(keys, vec!["ALPHA".to_string(), "ZETA".to_string()]);
}

#[test]
fn clones_share_the_same_rows() {
    let config = store();
    let other = config.clone();
    config.set("K", "v1", None).unwrap();
    assert_eq!(other.get("K").unwrap(), "v1");
}
