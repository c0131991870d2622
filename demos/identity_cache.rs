//! Caching by object identity without keeping objects alive.

use memento::{wrap, ByIdentity, IdentityStore, MemoOptions};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct Image {
    name: String,
    pixels: Vec<u8>,
}

impl Drop for Image {
    fn drop(&mut self) {
        println!("  [drop] {} released ({} bytes)", self.name, self.pixels.len());
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let histogram = wrap(
        |img: Arc<Image>| {
            println!("  [miss] computing histogram of {}", img.name);
            let mut buckets = [0usize; 4];
            for &p in &img.pixels {
                buckets[(p / 64) as usize] += 1;
            }
            buckets
        },
        MemoOptions::new()
            .name("histogram")
            .key_fn(ByIdentity)
            .cache_factory(IdentityStore::new),
    );

    let photo = Arc::new(Image {
        name: "photo.png".into(),
        pixels: (0..=255).collect(),
    });
    let copy = Arc::new(Image {
        name: "copy.png".into(),
        pixels: (0..=255).collect(),
    });

    println!("histogram(photo) = {:?}", histogram.call(Arc::clone(&photo)));
    println!("histogram(photo) = {:?}", histogram.call(Arc::clone(&photo)));
    println!("histogram(copy)  = {:?}", histogram.call(Arc::clone(&copy)));
    println!("live entries: {}\n", histogram.len());

    println!("dropping photo.png");
    drop(photo);
    println!("live entries: {}", histogram.len());

    let raw = histogram.cache().with_store(|store| store.raw_len());
    println!("raw entries awaiting purge: {raw}");
    println!("\ncopy.png still cached: {}", histogram.contains(&copy));
}
