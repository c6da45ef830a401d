use std::sync::Arc;

use anyhow::Result;
use portable_vfs::{Fs, MemoryStore, StorageBackend, VfsFile};

fn greet(fs: &Fs) -> Result<String> {
    // creates `docs` and, on the key-value backend, a directory record for it
    fs.mkdir_all("docs", 0o755)?;

    // nothing reaches the store until `sync`
    let file = fs.create("docs/first.txt")?;
    file.write(b"Hello")?;
    file.sync()?;
    file.close()?;

    let file = fs.create("second.txt")?;
    file.write(b"World")?;
    file.sync()?;
    file.close()?;

    let first = fs.open("docs/first.txt")?.read_to_end()?;
    let second = fs.open("second.txt")?.read_to_end()?;
    assert_eq!(fs.stat("docs/first.txt")?.size(), 5);
    assert!(fs.stat("docs")?.is_dir());

    // removes `docs` with everything inside it, then the second file
    fs.remove_all("docs")?;
    fs.remove("second.txt")?;

    Ok(format!(
        "{}, {}!",
        String::from_utf8(first)?,
        String::from_utf8(second)?
    ))
}

fn main() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let kv = Fs::key_value(StorageBackend::with_scopes(store.clone(), "demo", "main")?);
    println!("key-value: {}", greet(&kv)?);
    println!("keys left in the store: {}", store.len());

    let root = std::env::temp_dir().join("portable_vfs_demo");
    println!("Temp dir: {}", root.display());
    let native = Fs::native(&root)?;
    println!("native: {}", greet(&native)?);

    Ok(())
}
