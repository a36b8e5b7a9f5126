//! Integration test: engines over the file backend and under concurrent use.

use std::sync::Arc;

use digiwallet_credentials::{CredentialFilter, RevealFields};
use digiwallet_integration_tests::{temp_store_path, Deployment};
use digiwallet_storage::{open_store, FileStore, StorageBackend, StorageConfig, Store};

// =========================================================================
// File backend
// =========================================================================

#[test]
fn test_file_backend_survives_reopen() {
    let path = temp_store_path("reopen");
    let config = StorageConfig {
        backend: StorageBackend::File,
        path: path.clone(),
    };

    let (issuer_did, holder, vc_id) = {
        let d = Deployment::over(open_store(&config).unwrap());
        let vc = d.issue_degree(Some(30));
        (d.issuer_did.clone(), d.holder().clone(), vc.id)
    };

    let d = Deployment::reopen(open_store(&config).unwrap(), issuer_did, holder);
    let vc = d.wallet.get_credential(&vc_id).unwrap();
    assert!(d.wallet.verify_credential(&vc).unwrap());

    // Keys survived too: the reopened wallet can still sign.
    let vp = d
        .wallet
        .build_presentation(&[vc_id], &RevealFields::new(), "reopen-1")
        .unwrap();
    d.verifier().verify_presentation(&vp).unwrap();

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn test_file_backend_writes_json_lines() {
    let path = temp_store_path("jsonl");
    let store: Arc<dyn Store> = Arc::new(FileStore::open(&path).unwrap());
    let d = Deployment::over(store);
    d.issue_degree(None);

    let contents = std::fs::read_to_string(&path).unwrap();
    let keys: Vec<String> = contents
        .lines()
        .map(|line| {
            let entry: serde_json::Value = serde_json::from_str(line).unwrap();
            entry["key"].as_str().unwrap().to_string()
        })
        .collect();
    assert!(keys.iter().any(|k| k.starts_with("privatekey:")));
    assert!(keys.iter().any(|k| k.starts_with("did:")));
    assert!(keys.iter().any(|k| k.starts_with("vc:")));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issuance_and_listing() {
    let d = Arc::new(Deployment::in_memory());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let d = Arc::clone(&d);
        handles.push(tokio::task::spawn_blocking(move || {
            let vc = d.issue_degree(Some(10));
            // Readers see complete documents while other writers run.
            let listed = d
                .wallet
                .list_credentials(&CredentialFilter::default())
                .unwrap();
            assert!(!listed.is_empty());
            vc.id
        }));
    }

    let mut ids = Vec::new();
    for h in handles {
        ids.push(h.await.unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);

    let all = d
        .wallet
        .list_credentials(&CredentialFilter::default())
        .unwrap();
    assert_eq!(all.len(), 16);
    for vc in &all {
        assert!(d.wallet.verify_credential(vc).unwrap());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_to_file_backend() {
    let path = temp_store_path("concurrent");
    let store: Arc<dyn Store> = Arc::new(FileStore::open(&path).unwrap());
    let d = Arc::new(Deployment::over(store));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let d = Arc::clone(&d);
        handles.push(tokio::task::spawn_blocking(move || d.issue_degree(None).id));
    }
    for h in handles {
        h.await.unwrap();
    }

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.list_keys("vc:").unwrap().len(), 8);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
