use crate::{
    error::Fault,
    runtime::memory::{MemoryStore, ReadPolicy},
};

#[test]
fn allocate_uses_max_id_plus_one() {
    let mut memory = MemoryStore::new();
    assert_eq!(memory.allocate(), 1);
    assert_eq!(memory.allocate(), 2);
    assert_eq!(memory.allocate(), 3);

    memory.incref(3).unwrap();
    let collected = memory.collect();
    assert_eq!(collected, vec![1, 2]);

    // 3 is still live, so the next id continues above it
    assert_eq!(memory.allocate(), 4);
}

#[test]
fn ids_restart_once_store_is_empty() {
    let mut memory = MemoryStore::new();
    memory.allocate();
    memory.allocate();
    memory.collect();
    assert_eq!(memory.live_count(), 0);
    assert_eq!(memory.allocate(), 1);
    assert_eq!(memory.total_allocations(), 3);
}

#[test]
fn bind_and_read() {
    let mut memory = MemoryStore::new();
    let id = memory.allocate();
    assert_eq!(memory.is_bound(id), Ok(false));

    memory.bind(id, 11).unwrap();
    assert_eq!(memory.is_bound(id), Ok(true));
    assert_eq!(memory.read(id, ReadPolicy::Strict), Ok(11));

    memory.bind(id, -3).unwrap();
    assert_eq!(memory.read(id, ReadPolicy::Lenient), Ok(-3));
}

#[test]
fn unbound_read_depends_on_policy() {
    let mut memory = MemoryStore::new();
    let id = memory.allocate();
    assert_eq!(memory.read(id, ReadPolicy::Lenient), Ok(0));
    assert_eq!(memory.read(id, ReadPolicy::Strict), Err(Fault::UnboundRead(id)));
}

#[test]
fn missing_cells_are_dangling() {
    let mut memory = MemoryStore::new();
    assert_eq!(memory.bind(9, 1), Err(Fault::DanglingReference(9)));
    assert_eq!(
        memory.read(9, ReadPolicy::Lenient),
        Err(Fault::DanglingReference(9))
    );
    assert_eq!(memory.incref(9), Err(Fault::DanglingReference(9)));
    assert_eq!(memory.is_bound(9), Err(Fault::DanglingReference(9)));
}

#[test]
fn collect_keeps_referenced_cells() {
    let mut memory = MemoryStore::new();
    let a = memory.allocate();
    let b = memory.allocate();
    memory.incref(a).unwrap();
    memory.incref(a).unwrap();

    assert_eq!(memory.collect(), vec![b]);
    assert_eq!(memory.refs(a), Some(2));

    memory.release(&[a]);
    assert!(memory.collect().is_empty());
    assert!(memory.contains(a));

    memory.release(&[a]);
    assert_eq!(memory.collect(), vec![a]);
    assert_eq!(memory.live_count(), 0);
    assert_eq!(memory.total_collections(), 3);
    assert_eq!(memory.total_collected(), 2);
}

#[test]
fn release_skips_missing_cells() {
    let mut memory = MemoryStore::new();
    let a = memory.allocate();
    memory.incref(a).unwrap();
    memory.release(&[42, a]);
    assert_eq!(memory.refs(a), Some(0));
}

#[test]
fn decref_of_unreferenced_cell_stays_at_zero() {
    let mut memory = MemoryStore::new();
    let a = memory.allocate();
    memory.incref(a).unwrap();
    memory.decref(a).unwrap();
    assert_eq!(memory.decref(a), Ok(()));
    assert_eq!(memory.refs(a), Some(0));
    assert_eq!(memory.decref(7), Err(Fault::DanglingReference(7)));
}
