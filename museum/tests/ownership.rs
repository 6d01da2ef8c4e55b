use std::path::PathBuf;

use museum::mint::MintLedger;
use museum::wallet::{TransferOutcome, WalletSession};
use museum::{JsonFileStore, ModelRecord, OwnershipRecord, OwnershipStore};

fn scratch_path(test: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("sector77-{test}-{}", std::process::id()))
        .join("nested")
        .join("owned_models.json")
}

fn cleanup(path: &PathBuf) {
    if let Some(dir) = path.parent().and_then(|nested| nested.parent()) {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn minted_model_is_still_owned_after_reload() {
    let path = scratch_path("reload");
    let signer = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
        .parse()
        .unwrap();
    let mut wallet = WalletSession::new(Some(signer));
    wallet.connect();
    let record = ModelRecord::new("Tachikoma", "0.01", 100).ownable();

    {
        let mut ownership = OwnershipRecord::load(Box::new(JsonFileStore::new(&path)), &[]);
        let mut ledger = MintLedger::default();
        assert!(ledger.begin(&record, &wallet).is_some());
        ledger.settle(
            TransferOutcome {
                record: record.clone(),
                result: Ok("0x1234".into()),
            },
            &mut ownership,
        );
        assert!(ownership.is_owned("Tachikoma"));
    }

    let reloaded = OwnershipRecord::load(Box::new(JsonFileStore::new(&path)), &[]);
    assert!(reloaded.is_owned("Tachikoma"));
    assert!(!reloaded.is_owned("Swordfish II"));

    cleanup(&path);
}

#[test]
fn file_is_plain_json_object() {
    let path = scratch_path("format");
    let store = JsonFileStore::new(&path);
    let mut ownership = OwnershipRecord::load(Box::new(store.clone()), &[]);

    ownership.set_owned("Swordfish II");

    let raw = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, serde_json::json!({ "Swordfish II": true }));
    assert_eq!(store.load().unwrap().len(), 1);

    cleanup(&path);
}

#[test]
fn demo_entries_merge_over_stored_ones() {
    let path = scratch_path("demo");
    JsonFileStore::new(&path)
        .save(&[("Swordfish II".to_string(), false)].into_iter().collect())
        .unwrap();

    let mut ownership = OwnershipRecord::load(
        Box::new(JsonFileStore::new(&path)),
        &["Swordfish II".to_string()],
    );
    assert!(ownership.is_owned("Swordfish II"));

    // The next change persists the merged view.
    ownership.set_owned("Tachikoma");
    let stored = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(stored.get("Swordfish II"), Some(&true));
    assert_eq!(stored.get("Tachikoma"), Some(&true));

    cleanup(&path);
}
