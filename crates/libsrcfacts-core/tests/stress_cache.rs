//! Stress tests for concurrent entity creation
//!
//! Traversal workers may request the same file from several threads; every
//! caller must observe the one entity that was constructed.

use libsrcfacts_core::{Compilation, Context, Entity, ExtractorConfig, File, MemorySink};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

fn new_context() -> Arc<Context> {
    Arc::new(Context::new(
        ExtractorConfig::default(),
        Compilation::default(),
        Arc::new(MemorySink::new()),
    ))
}

#[test]
fn test_concurrent_create_same_path() {
    let cx = new_context();
    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let cx = Arc::clone(&cx);
            let barrier = Arc::clone(&barrier);

            thread::spawn(move || {
                // Mix separator styles; all canonicalize to one ID
                let path = if thread_id % 2 == 0 {
                    "c:\\repo\\src\\Program.cs"
                } else {
                    "C:/repo/src/Program.cs"
                };
                barrier.wait();
                File::create(&cx, Some(path)).expect("create file")
            })
        })
        .collect();

    let files: Vec<Arc<File>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for file in &files[1..] {
        assert!(Arc::ptr_eq(&files[0], file));
    }
    assert_eq!(cx.file_count(), 1);
}

#[test]
fn test_concurrent_create_generated() {
    let cx = new_context();
    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let cx = Arc::clone(&cx);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                File::create_generated(&cx)
            })
        })
        .collect();

    let files: Vec<Arc<File>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for file in &files[1..] {
        assert!(Arc::ptr_eq(&files[0], file));
    }

    // Only one entity was queued for population
    let stats = cx.populate_all().unwrap();
    assert_eq!(stats.populated, 1);
    assert_eq!(stats.skipped, 0);
}

#[test]
fn test_concurrent_create_many_paths() {
    let cx = new_context();
    let num_threads = 8;
    let paths_per_thread = 100;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let cx = Arc::clone(&cx);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Every thread requests the same set of paths
                (0..paths_per_thread)
                    .map(|i| {
                        let file = File::create(&cx, Some(format!("/repo/src/f{}.cs", i).as_str()))
                            .expect("create file");
                        file.key().clone()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut keys = HashSet::new();
    for handle in handles {
        keys.extend(handle.join().unwrap());
    }

    assert_eq!(keys.len(), paths_per_thread);
    assert_eq!(cx.file_count(), paths_per_thread);

    // None of these files are in the compilation, so all are skipped once each
    let stats = cx.populate_all().unwrap();
    assert_eq!(stats.populated, 0);
    assert_eq!(stats.skipped, paths_per_thread);
}
