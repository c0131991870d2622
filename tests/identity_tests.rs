/// Integration tests for identity-keyed caches backed by weak references
use memento::{wrap, ByIdentity, CacheStore, IdentityKey, IdentityStore, MemoOptions};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Document {
    text: String,
    drops: Arc<AtomicUsize>,
}

impl Drop for Document {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

fn document(text: &str, drops: &Arc<AtomicUsize>) -> Arc<Document> {
    Arc::new(Document {
        text: text.to_string(),
        drops: Arc::clone(drops),
    })
}

#[test]
fn test_same_object_hits_equal_object_misses() {
    let drops = Arc::new(AtomicUsize::new(0));
    let runs = Cell::new(0);
    let word_count = wrap(
        |doc: Arc<Document>| {
            runs.set(runs.get() + 1);
            doc.text.split_whitespace().count()
        },
        MemoOptions::new()
            .key_fn(ByIdentity)
            .cache_factory(IdentityStore::new),
    );

    let a = document("the quick brown fox", &drops);
    let b = document("the quick brown fox", &drops);

    assert_eq!(word_count.call(Arc::clone(&a)), 4);
    assert_eq!(word_count.call(Arc::clone(&a)), 4);
    assert_eq!(runs.get(), 1);

    // Identity, not equality: an equal but distinct object is a new key.
    assert_eq!(word_count.call(Arc::clone(&b)), 4);
    assert_eq!(runs.get(), 2);
    assert_eq!(word_count.len(), 2);
}

#[test]
fn test_cache_does_not_keep_key_alive() {
    let drops = Arc::new(AtomicUsize::new(0));
    let summary = wrap(
        |doc: Arc<Document>| doc.text.to_uppercase(),
        MemoOptions::new()
            .key_fn(ByIdentity)
            .cache_factory(IdentityStore::new),
    );

    let doc = document("weak refs", &drops);
    assert_eq!(summary.call(Arc::clone(&doc)), "WEAK REFS");
    assert!(summary.contains(&doc));

    drop(doc);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert_eq!(summary.len(), 0);
    assert!(summary.is_empty());

    let raw = summary.cache().with_store(|store| store.raw_len());
    assert!(raw <= 1);
}

#[test]
fn test_dead_entries_reclaimed_while_wrapper_lives() {
    let drops = Arc::new(AtomicUsize::new(0));
    let length = wrap(
        |doc: Arc<Document>| doc.text.len(),
        MemoOptions::new()
            .key_fn(ByIdentity)
            .cache_factory(IdentityStore::new),
    );

    for i in 0..1_000 {
        let doc = document(&format!("document number {i}"), &drops);
        length.call(doc);
    }
    assert_eq!(drops.load(Ordering::SeqCst), 1_000);
    assert_eq!(length.len(), 0);

    // Amortised purging keeps dead entries bounded instead of growing with
    // every call.
    let raw = length.cache().with_store(|store| store.raw_len());
    assert!(raw < 100, "raw entries: {raw}");
}

#[test]
fn test_invalidate_by_object() {
    let drops = Arc::new(AtomicUsize::new(0));
    let runs = Cell::new(0);
    let render = wrap(
        |doc: Arc<Document>| {
            runs.set(runs.get() + 1);
            format!("<p>{}</p>", doc.text)
        },
        MemoOptions::new()
            .key_fn(ByIdentity)
            .cache_factory(IdentityStore::new),
    );

    let doc = document("hi", &drops);
    render.call(Arc::clone(&doc));
    assert!(render.invalidate(&doc));
    render.call(Arc::clone(&doc));
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_store_used_directly() {
    let mut store: IdentityStore<str, usize> = IdentityStore::new();
    let name: Arc<str> = Arc::from("memento");
    let key = IdentityKey::of(&name);

    store.insert(key.clone(), name.len());
    assert_eq!(store.get(&key), Some(7));
    assert_eq!(key.upgrade().as_deref(), Some("memento"));

    drop(name);
    assert!(!key.is_alive());
    assert_eq!(store.get(&key), None);
    assert_eq!(store.raw_len(), 0);
}
