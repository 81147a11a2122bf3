use std::{collections::HashSet, path::Path};

use rand::{rngs::StdRng, SeedableRng};
use uniqgen::{
    fingerprint::fingerprint, synth, FingerprintStore, GenParams, Generator, RunState,
};

async fn generator_in(dir: &Path, seed: u64) -> Generator {
    let store = FingerprintStore::open(dir.join("Data").join("image_database.db"))
        .await
        .unwrap();
    Generator::new(
        store,
        GenParams { out_dir: dir.join("Generated"), width: 250, height: 200, seed: Some(seed) },
    )
}

fn png_names(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(rd) => rd
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".png"))
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn fresh_store_single_tick_writes_one_file_and_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator_in(dir.path(), 1).await;

    let out = generator.tick().await.unwrap().unwrap();

    let files = png_names(&dir.path().join("Generated"));
    assert_eq!(files, vec![format!("{}.png", out.fingerprint)]);
    assert_eq!(generator.store().count_rows().await.unwrap(), 1);
    assert!(generator.store().contains(&out.fingerprint));
    generator.close().await;
}

#[tokio::test]
async fn paused_tick_has_no_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator_in(dir.path(), 2).await;
    generator.tick().await.unwrap();
    let before: HashSet<_> = generator.store().fingerprints().cloned().collect();

    generator.pause();
    assert_eq!(generator.state(), RunState::Paused);
    for _ in 0..3 {
        assert!(generator.tick().await.unwrap().is_none());
    }

    let after: HashSet<_> = generator.store().fingerprints().cloned().collect();
    assert_eq!(before, after);
    assert_eq!(png_names(&dir.path().join("Generated")).len(), 1);
    assert_eq!(generator.store().count_rows().await.unwrap(), 1);
    generator.close().await;
}

#[tokio::test]
async fn resume_ticks_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator_in(dir.path(), 3).await;
    generator.pause();

    let out = generator.resume().await.unwrap().expect("resume produces an image without waiting");
    assert_eq!(generator.state(), RunState::Running);
    assert!(out.path.exists());
    assert_eq!(generator.last_fingerprint(), Some(&out.fingerprint));
    generator.close().await;
}

#[tokio::test]
async fn registered_fingerprints_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = generator_in(dir.path(), 4).await;
    let mut saved = Vec::new();
    for _ in 0..5 {
        saved.push(generator.tick().await.unwrap().unwrap().fingerprint);
    }
    let before: HashSet<_> = generator.store().fingerprints().cloned().collect();
    generator.close().await;

    let mut store = FingerprintStore::open(dir.path().join("Data").join("image_database.db"))
        .await
        .unwrap();
    let after: HashSet<_> = store.fingerprints().cloned().collect();
    assert_eq!(before, after);
    for fp in &saved {
        assert!(store.contains(fp));
    }
    store.close().await;
}

#[tokio::test]
async fn reopened_generator_never_repeats_known_content() {
    let dir = tempfile::tempdir().unwrap();
    // same seed twice: the second run draws the exact same first candidate
    let mut first = generator_in(dir.path(), 5).await;
    let a = first.tick().await.unwrap().unwrap().fingerprint;
    first.close().await;

    let mut second = generator_in(dir.path(), 5).await;
    let b = second.tick().await.unwrap().unwrap().fingerprint;
    assert_ne!(a, b);
    assert_eq!(second.store().len(), 2);
    assert_eq!(png_names(&dir.path().join("Generated")).len(), 2);
    second.close().await;
}

#[test]
fn ten_thousand_candidates_do_not_collide() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let img = synth::random_image(&mut rng, 16, 16);
        assert!(seen.insert(fingerprint(&img)));
    }
    assert_eq!(seen.len(), 10_000);
}

#[tokio::test]
async fn tick_loop_writes_one_distinct_file_per_image() {
    let dir = tempfile::tempdir().unwrap();
    let store = FingerprintStore::open(dir.path().join("fp.db")).await.unwrap();
    let out_dir = dir.path().join("Generated");
    let mut generator = Generator::new(
        store,
        GenParams { out_dir: out_dir.clone(), width: 2, height: 2, seed: Some(99) },
    );

    const TICKS: usize = 500;
    for _ in 0..TICKS {
        generator.tick().await.unwrap().unwrap();
    }

    let names = png_names(&out_dir);
    assert_eq!(names.len(), TICKS);
    for name in &names {
        let decoded = image::open(out_dir.join(name)).unwrap().to_rgb8();
        assert_eq!(*name, fingerprint(&decoded).file_name());
    }
    assert_eq!(generator.store().count_rows().await.unwrap(), TICKS as i64);
    generator.close().await;
}
