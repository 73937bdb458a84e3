// ABOUTME: Tests for the file-backed state store and the record repositories.
// ABOUTME: Verifies persistence layout, first-use creation and repository semantics.

use bosun::state::{
    DeploymentState, DiskRepo, FileStateStore, StateError, StateStore, StemcellRepo, VmRepo,
};
use bosun::types::{DiskCid, StemcellCid, VmCid};
use serde_json::{Map, Value};
use std::sync::Arc;
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> Arc<dyn StateStore> {
    Arc::new(FileStateStore::new(dir.path().join("dev-state.json")))
}

mod file_store {
    use super::*;

    #[test]
    fn first_load_creates_state_with_ids() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        let state = store.load().unwrap();

        assert!(dir.path().join("dev-state.json").exists());
        assert!(!state.director_id.is_empty());
        assert!(!state.installation_id.is_empty());
        assert!(state.is_empty());
        // The generated ids are stable across loads.
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn read_never_creates_the_file() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        assert!(store.read().unwrap().is_none());
        assert!(!dir.path().join("dev-state.json").exists());

        let state = store.load().unwrap();
        assert_eq!(store.read().unwrap(), Some(state));
    }

    #[test]
    fn persists_documented_field_names() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        VmRepo::new(Arc::clone(&store))
            .update_current(&VmCid::new("vm-1"))
            .unwrap();
        let disks = DiskRepo::new(Arc::clone(&store));
        let disk = disks.save(&DiskCid::new("disk-1"), 2048, Map::new()).unwrap();
        disks.update_current(&disk.id).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("dev-state.json")).unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(json["current_vm_cid"], "vm-1");
        assert_eq!(json["current_disk_id"], disk.id.as_str());
        assert_eq!(json["disks"][0]["cid"], "disk-1");
        assert_eq!(json["disks"][0]["size"], 2048);
        assert!(json["director_id"].is_string());
        assert!(json.get("current_stemcell_id").is_none());
    }

    #[test]
    fn reads_legacy_empty_string_pointers() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("dev-state.json"),
            r#"{"director_id":"d","installation_id":"i","current_vm_cid":"","current_disk_id":"","current_stemcell_id":"","disks":[],"stemcells":[]}"#,
        )
        .unwrap();

        let state = file_store(&dir).load().unwrap();

        assert_eq!(state.director_id, "d");
        assert!(state.current_vm_cid.is_none());
        assert!(state.current_disk_id.is_none());
    }

    #[test]
    fn corrupt_document_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("dev-state.json"), "{not json").unwrap();

        let err = file_store(&dir).load().unwrap_err();
        assert!(matches!(err, StateError::Parse { .. }));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        store.save(&DeploymentState::generate()).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["dev-state.json"]);
    }
}

mod repos {
    use super::*;

    #[test]
    fn disk_current_pointer_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = DiskRepo::new(file_store(&dir));

        assert!(repo.find_current().unwrap().is_none());
        let record = repo.save(&DiskCid::new("disk-1"), 1024, Map::new()).unwrap();
        repo.update_current(&record.id).unwrap();

        assert_eq!(repo.find_current().unwrap(), Some(record.clone()));
        assert_eq!(repo.find(&DiskCid::new("disk-1")).unwrap(), Some(record));

        repo.clear_current().unwrap();
        assert!(repo.find_current().unwrap().is_none());
        assert_eq!(repo.all().unwrap().len(), 1);
    }

    #[test]
    fn update_current_requires_a_record() {
        let dir = TempDir::new().unwrap();
        let repo = StemcellRepo::new(file_store(&dir));

        let err = repo
            .update_current(&bosun::types::StemcellId::new("missing"))
            .unwrap_err();
        assert!(matches!(err, StateError::RecordNotFound { kind: "stemcell", .. }));
    }

    #[test]
    fn duplicate_cid_is_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = StemcellRepo::new(file_store(&dir));
        repo.save("ubuntu", "1", &StemcellCid::new("sc-1"), 2).unwrap();

        let err = repo
            .save("ubuntu", "2", &StemcellCid::new("sc-1"), 2)
            .unwrap_err();
        assert!(matches!(err, StateError::DuplicateCid { .. }));
    }

    #[test]
    fn delete_clears_matching_current_pointer() {
        let dir = TempDir::new().unwrap();
        let repo = StemcellRepo::new(file_store(&dir));
        let old = repo.save("ubuntu", "1", &StemcellCid::new("sc-1"), 2).unwrap();
        let new = repo.save("ubuntu", "2", &StemcellCid::new("sc-2"), 2).unwrap();
        repo.update_current(&new.id).unwrap();

        assert_eq!(repo.unused().unwrap(), vec![old.clone()]);

        repo.delete(&old.id).unwrap();
        assert_eq!(repo.find_current().unwrap(), Some(new.clone()));

        repo.delete(&new.id).unwrap();
        assert!(repo.find_current().unwrap().is_none());
        assert!(repo.all().unwrap().is_empty());

        // Deleting again is harmless.
        repo.delete(&new.id).unwrap();
    }

    #[test]
    fn vm_repo_tracks_cid_only() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        let repo = VmRepo::new(Arc::clone(&store));

        repo.update_current(&VmCid::new("vm-7")).unwrap();
        assert_eq!(repo.find_current().unwrap(), Some(VmCid::new("vm-7")));

        repo.clear_current().unwrap();
        assert!(repo.find_current().unwrap().is_none());
        assert!(store.load().unwrap().is_empty());
    }
}
