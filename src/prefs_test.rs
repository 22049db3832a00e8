use super::*;

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = Prefs::load(&dir.path().join("absent.json")).unwrap();
    assert!(!prefs.no_interaction);
}

#[test]
fn save_then_load_keeps_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    Prefs { no_interaction: true }.save(&path).unwrap();
    assert!(Prefs::load(&path).unwrap().no_interaction);
}

#[test]
fn empty_object_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "{}").unwrap();
    assert_eq!(Prefs::load(&path).unwrap(), Prefs::default());
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(Prefs::load(&path), Err(PrefsError::Json(_))));
}
