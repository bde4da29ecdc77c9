//! End-to-end scenarios spanning more than one module: a handle over a live
//! backend, a provider registry, read-only composition, and cross-column
//! batches and snapshots.

use ethrex_kvstore::backend::memory::MemoryBackend;
use ethrex_kvstore::backend::null::NullBackend;
use ethrex_kvstore::factory::{
    ColumnGroupFactory, Factory, MemoryFactory, NullFactory, OwnedColumnGroup, PersistentFactory,
    ReadOnlyFactory,
};
use ethrex_kvstore::{
    ColumnName, Database, InMemoryColumnGroup, Provider, ReadOnlyMode, ReadOnlyProvider,
    ReceiptsColumn, Settings,
};

#[test]
fn in_memory_round_trip_through_a_provider() {
    let backend = MemoryBackend::new(ColumnName::State);
    let mut provider = Provider::new();
    provider.insert(ColumnName::State, Database::new(&backend));

    let state = provider.get(ColumnName::State).unwrap();
    state.put(b"addr", Some(b"account-bytes")).unwrap();
    assert_eq!(
        state.get(b"addr").unwrap().unwrap().as_bytes(),
        b"account-bytes"
    );
    assert!(provider.get(ColumnName::Code).is_err());
}

#[test]
fn null_backend_discards_writes_silently() {
    let backend = NullBackend::new(ColumnName::Bloom);
    let db = Database::new(&backend);

    db.put(b"k", Some(b"v")).unwrap();
    assert!(db.get(b"k").unwrap().is_none());
    assert!(!db.contains(b"k").unwrap());
}

#[test]
fn read_only_provider_strict_mode_forwards_reads_rejects_writes() {
    let backend = MemoryBackend::new(ColumnName::Headers);
    backend.put(b"h", Some(b"header-bytes"), Default::default()).unwrap();

    let mut provider = Provider::new();
    provider.insert(ColumnName::Headers, Database::new(&backend));
    let ro = ReadOnlyProvider::new(provider, ReadOnlyMode::Strict);

    let headers = ro.get(ColumnName::Headers).unwrap();
    assert_eq!(headers.get(b"h").unwrap().unwrap().as_bytes(), b"header-bytes");
    assert!(headers.put(b"h", Some(b"tampered")).is_err());
}

#[test]
fn read_only_provider_overlay_clear_cycle_restores_base_view() {
    let backend = MemoryBackend::new(ColumnName::Storage);
    backend
        .put(b"slot", Some(b"v0"), Default::default())
        .unwrap();

    let mut provider = Provider::new();
    provider.insert(ColumnName::Storage, Database::new(&backend));
    let ro = ReadOnlyProvider::new(provider, ReadOnlyMode::Overlay);

    let storage = ro.get(ColumnName::Storage).unwrap();
    storage.put(b"slot", Some(b"speculative")).unwrap();
    storage.put(b"new-slot", Some(b"also-speculative")).unwrap();
    assert_eq!(storage.get(b"slot").unwrap().unwrap().as_bytes(), b"speculative");

    ro.clear_all_temp_changes().unwrap();

    let storage = ro.get(ColumnName::Storage).unwrap();
    assert_eq!(storage.get(b"slot").unwrap().unwrap().as_bytes(), b"v0");
    assert!(storage.get(b"new-slot").unwrap().is_none());
}

#[test]
fn column_group_snapshot_is_isolated_per_column() {
    let owned = InMemoryColumnGroup::<ReceiptsColumn>::new(ColumnName::Receipts);
    let group = owned.columns_db();

    group
        .get_column_db(ReceiptsColumn::Default)
        .put(b"tx", Some(b"receipt-v1"))
        .unwrap();
    let snap = group.snapshot().unwrap();
    group
        .get_column_db(ReceiptsColumn::Default)
        .put(b"tx", Some(b"receipt-v2"))
        .unwrap();

    assert_eq!(
        snap.get_column(ReceiptsColumn::Default)
            .get(b"tx", Default::default())
            .unwrap()
            .unwrap()
            .as_bytes(),
        b"receipt-v1"
    );
    assert_eq!(
        group
            .get_column_db(ReceiptsColumn::Default)
            .get(b"tx")
            .unwrap()
            .unwrap()
            .as_bytes(),
        b"receipt-v2"
    );
}

#[test]
fn cross_column_write_batch_commits_each_column_in_order() {
    let owned = InMemoryColumnGroup::<ReceiptsColumn>::new(ColumnName::Receipts);
    let group = owned.columns_db();

    let mut batch = group.batch();
    batch.for_column(ReceiptsColumn::Default).put(b"tx1", b"r1");
    batch.for_column(ReceiptsColumn::Transactions).put(b"tx1", b"tx-bytes");
    batch.for_column(ReceiptsColumn::Blocks).put(b"block1", b"block-bytes");
    assert_eq!(batch.pending(), 3);

    batch.commit().unwrap();
    assert_eq!(batch.pending(), 0);

    assert_eq!(
        group.get_column_db(ReceiptsColumn::Default).get(b"tx1").unwrap().unwrap().as_bytes(),
        b"r1"
    );
    assert_eq!(
        group
            .get_column_db(ReceiptsColumn::Transactions)
            .get(b"tx1")
            .unwrap()
            .unwrap()
            .as_bytes(),
        b"tx-bytes"
    );
    assert_eq!(
        group.get_column_db(ReceiptsColumn::Blocks).get(b"block1").unwrap().unwrap().as_bytes(),
        b"block-bytes"
    );
}

#[test]
fn memory_factory_and_read_only_factory_compose() {
    let settings = Settings::new(ColumnName::State, "/tmp/ethrex-kvstore-e2e");
    let memory_factory = MemoryFactory;
    let owned = memory_factory.create_db(&settings).unwrap();
    owned.handle().put(b"k", Some(b"v")).unwrap();

    let ro_factory = ReadOnlyFactory::new(MemoryFactory, ReadOnlyMode::Overlay);
    let ro_owned = ro_factory.create_db(&settings).unwrap();
    // A fresh factory product starts from an empty base of its own; this
    // exercises the composition, not shared state with `owned` above.
    ro_owned.handle().put(b"only-in-overlay", Some(b"x")).unwrap();
    assert_eq!(
        ro_owned.handle().get(b"only-in-overlay").unwrap().unwrap().as_bytes(),
        b"x"
    );
}

#[test]
fn memory_factory_opens_a_full_column_group_from_one_shared_base() {
    let base = Settings::new(ColumnName::State, "/tmp/ethrex-kvstore-e2e");
    let factory = MemoryFactory;
    let owned: OwnedColumnGroup<ColumnName> = factory.create_column_group_db(&base).unwrap();
    let group = owned.columns_db();

    group.get_column_db(ColumnName::State).put(b"addr", Some(b"account-bytes")).unwrap();
    group.get_column_db(ColumnName::Code).put(b"addr", Some(b"code-bytes")).unwrap();

    assert_eq!(
        group.get_column_db(ColumnName::State).get(b"addr").unwrap().unwrap().as_bytes(),
        b"account-bytes"
    );
    assert_eq!(
        group.get_column_db(ColumnName::Code).get(b"addr").unwrap().unwrap().as_bytes(),
        b"code-bytes"
    );
}

#[test]
fn null_factory_path_and_settings_roundtrip() {
    let settings = Settings::new(ColumnName::Metadata, "/tmp/ethrex-kvstore-e2e")
        .with_delete_on_start(false);
    let factory = NullFactory;
    let path = factory.get_full_db_path(&settings);
    assert_eq!(path, std::path::PathBuf::from("/tmp/ethrex-kvstore-e2e/metadata"));

    let owned = factory.create_db(&settings).unwrap();
    owned.handle().put(b"k", Some(b"v")).unwrap();
    assert!(owned.handle().get(b"k").unwrap().is_none());
}

#[test]
fn persistent_factory_stub_surfaces_storage_failure_until_a_real_engine_is_wired_in() {
    let dir = tempdir::TempDir::new("ethrex-kvstore-persistent").unwrap();
    let settings = Settings::new(ColumnName::Blocks, dir.path());
    let factory = PersistentFactory;

    let owned = factory.create_db(&settings).unwrap();
    assert!(owned.handle().get(b"k").is_err());
    assert!(owned.handle().put(b"k", Some(b"v")).is_err());
}

#[test]
fn persistent_factory_rejects_delete_on_start_without_can_delete_folder() {
    let dir = tempdir::TempDir::new("ethrex-kvstore-persistent").unwrap();
    let settings = Settings::new(ColumnName::Blocks, dir.path())
        .with_delete_on_start(true)
        .with_can_delete_folder(false);
    let factory = PersistentFactory;

    assert!(factory.create_db(&settings).is_err());
}
