use snapiter::prelude::*;
use snapiter::snapiter_io::{build_storage_from_config, MemoryStorage};
use snapiter::snapiter_store::{Error as StoreError, Storage};

fn pipeline() -> Product<SequenceProducer<u32>> {
    Product::new(vec![vec![1, 2, 3], vec![10, 20]])
}

#[test]
fn saves_and_resumes_latest_from_memory() {
    let memory = MemoryStorage::new();
    let mut store = CheckpointStore::new(Box::new(memory.clone()), "ckpt");
    let id = PipelineId::new(7);

    let mut p = pipeline();
    p.next().unwrap();
    let first = store.save(id, &Snapshot::capture(&p, Codec::None).unwrap()).unwrap();
    p.take_vec(2).unwrap();
    let second = store.save(id, &Snapshot::capture(&p, Codec::None).unwrap()).unwrap();

    assert!(second.generation > first.generation);
    assert_eq!(store.latest(id).unwrap().unwrap().name, second.name);
    assert_eq!(store.list().len(), 2);
    assert!(memory.contains(&second.path));

    let latest = store.latest(id).unwrap().unwrap();
    let mut resumed: Product<SequenceProducer<u32>> = store.load(&latest).unwrap().restore().unwrap();
    assert_eq!(resumed.drain_vec().unwrap(), p.drain_vec().unwrap());

    store.delete(&first.name).unwrap();
    assert!(store.get(&first.name).is_none());
    assert!(!memory.contains(&first.path));
    assert_eq!(store.list_stored().unwrap(), vec![second.path.clone()]);
}

#[test]
fn load_detects_tampering() {
    let memory = MemoryStorage::new();
    let mut store = CheckpointStore::new(Box::new(memory.clone()), "ckpt");

    let mut p = pipeline();
    p.next().unwrap();
    let meta = store
        .save(PipelineId::new(1), &Snapshot::capture(&p, Codec::None).unwrap())
        .unwrap();

    let mut bytes = memory.read_range(&meta.path, 0, meta.len as usize).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x40;
    memory.write(&meta.path, &bytes).unwrap();

    assert!(matches!(store.load(&meta), Err(StoreError::Stale { .. })));
    assert!(matches!(
        store.load_path(&meta.path),
        Err(StoreError::ChecksumMismatch)
    ));
}

#[test]
fn second_store_on_same_root_continues_generations() {
    let memory = MemoryStorage::new();
    let id = PipelineId::new(7);
    let mut p = pipeline();

    p.next().unwrap();
    let first = {
        let mut earlier = CheckpointStore::new(Box::new(memory.clone()), "ckpt");
        earlier
            .save(id, &Snapshot::capture(&p, Codec::None).unwrap())
            .unwrap()
    };

    let mut later = CheckpointStore::new(Box::new(memory.clone()), "ckpt");
    let found = later.latest(id).unwrap().unwrap();
    assert_eq!(found.name, first.name);
    assert_eq!(found.checksum, first.checksum);
    let mut resumed: Product<SequenceProducer<u32>> = later.load(&found).unwrap().restore().unwrap();
    assert_eq!(resumed.next().unwrap(), Some(vec![1, 20]));

    p.next().unwrap();
    let second = later
        .save(id, &Snapshot::capture(&p, Codec::None).unwrap())
        .unwrap();
    assert!(second.generation > first.generation);
    assert_eq!(later.list_stored().unwrap().len(), 2);
    assert_eq!(later.latest(id).unwrap().unwrap().name, second.name);
    assert_eq!(later.latest(PipelineId::new(8)).unwrap(), None);

    later.delete(&first.name).unwrap();
    assert_eq!(later.list_stored().unwrap(), vec![second.path]);
}

#[test]
fn oversized_snapshot_is_refused() {
    let mut store = CheckpointStore::new(Box::new(MemoryStorage::new()), "ckpt").with_max_bytes(16);
    let snap = Snapshot::capture(&pipeline(), Codec::None).unwrap();
    assert!(matches!(
        store.save(PipelineId::new(2), &snap),
        Err(StoreError::TooLarge { max: 16, .. })
    ));
}

#[test]
fn filesystem_checkpoints_survive_a_new_store() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = SnapiterConfig {
        checkpoint_dir: dir.path().join("ckpt").to_string_lossy().into_owned(),
        checkpoint_uri: Some("file:///unused".into()),
        ..SnapiterConfig::default()
    };
    let codec = Codec::from_name(&cfg.codec).unwrap();

    let mut p = pipeline();
    p.take_vec(4).unwrap();
    {
        let storage = build_storage_from_config(&cfg.storage_config()).unwrap();
        let mut store = CheckpointStore::new(storage, cfg.checkpoint_dir.clone());
        let snap = Snapshot::from_state(&p.capture().unwrap(), codec, cfg.max_snapshot_bytes).unwrap();
        store.save(PipelineId::new(3), &snap).unwrap();
    }

    let storage = build_storage_from_config(&cfg.storage_config()).unwrap();
    let store = CheckpointStore::new(storage, cfg.checkpoint_dir.clone())
        .with_max_bytes(cfg.max_snapshot_bytes);
    let stored = store.list_stored().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(
        store.latest(PipelineId::new(3)).unwrap().map(|m| m.path),
        Some(stored[0].clone())
    );

    let mut resumed: Product<SequenceProducer<u32>> =
        store.load_path(&stored[0]).unwrap().restore().unwrap();
    assert_eq!(resumed.drain_vec().unwrap(), vec![vec![3, 10], vec![3, 20]]);
}

#[test]
fn unknown_scheme_is_a_config_error() {
    let cfg = SnapiterConfig {
        checkpoint_uri: Some("s3://bucket/prefix".into()),
        ..SnapiterConfig::default()
    };
    assert!(matches!(
        build_storage_from_config(&cfg.storage_config()),
        Err(snapiter::snapiter_io::Error::Config(_))
    ));
}
