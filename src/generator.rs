use std::path::PathBuf;

use image::RgbImage;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::RunCfg,
    error::{GenError, StoreError},
    fingerprint::{fingerprint, Fingerprint},
    io::save_png,
    status::StatusReport,
    store::FingerprintStore,
    synth,
};

/// Upper bound on candidates tried by [`Generator::generate_unique`] before it
/// gives up. Only tiny images can realistically hit it.
pub const MAX_UNIQUE_ATTEMPTS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

#[derive(Debug, Clone)]
pub struct GenParams {
    pub out_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
}

impl From<&RunCfg> for GenParams {
    fn from(cfg: &RunCfg) -> Self {
        Self { out_dir: cfg.out_dir.clone(), width: cfg.width, height: cfg.height, seed: cfg.seed }
    }
}

/// A newly saved image, handed back to the caller for display.
#[derive(Debug, Clone)]
pub struct Generated {
    pub image: RgbImage,
    pub fingerprint: Fingerprint,
    pub path: PathBuf,
}

/// The generate / fingerprint / check / store loop.
///
/// Nothing here schedules itself: the owner calls [`tick`](Self::tick) as
/// often as it likes, and [`resume`](Self::resume) runs one tick right away.
pub struct Generator {
    store: FingerprintStore,
    params: GenParams,
    rng: StdRng,
    state: RunState,
    last: Option<Fingerprint>,
    saved: u64,
}

impl Generator {
    pub fn new(store: FingerprintStore, params: GenParams) -> Self {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { store, params, rng, state: RunState::Running, last: None, saved: 0 }
    }

    pub fn generate_candidate(&mut self) -> RgbImage {
        synth::random_image(&mut self.rng, self.params.width, self.params.height)
    }

    /// Draws candidates until one has a fingerprint the store has never seen.
    pub fn generate_unique(&mut self) -> Result<(RgbImage, Fingerprint), GenError> {
        for _ in 0..MAX_UNIQUE_ATTEMPTS {
            let img = self.generate_candidate();
            let fp = fingerprint(&img);
            if !self.store.contains(&fp) {
                return Ok((img, fp));
            }
            tracing::debug!(%fp, "candidate collided with a known fingerprint");
        }
        Err(GenError::Exhausted { attempts: MAX_UNIQUE_ATTEMPTS })
    }

    /// One unit of work. Paused ticks do nothing and return `Ok(None)`.
    pub async fn tick(&mut self) -> Result<Option<Generated>, GenError> {
        if self.state == RunState::Paused {
            return Ok(None);
        }

        let (image, fp) = self.generate_unique()?;
        if self.store.contains(&fp) {
            return Ok(None);
        }

        let path = save_png(&self.params.out_dir, &fp, &image).await?;
        if let Err(e) = self.store.register(&fp).await {
            // a duplicate's file already belongs to a recorded row
            if !matches!(e, StoreError::Duplicate(_)) {
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(
                        path = %path.display(),
                        "could not remove unrecorded image: {rm}"
                    );
                }
            }
            return Err(e.into());
        }

        self.last = Some(fp.clone());
        self.saved += 1;
        tracing::debug!(%fp, path = %path.display(), "saved new image");
        Ok(Some(Generated { image, fingerprint: fp, path }))
    }

    pub fn pause(&mut self) {
        self.state = RunState::Paused;
    }

    /// Switches back to running and ticks immediately. Returns `Ok(None)`
    /// without ticking when already running.
    pub async fn resume(&mut self) -> Result<Option<Generated>, GenError> {
        if self.state == RunState::Running {
            return Ok(None);
        }
        self.state = RunState::Running;
        self.tick().await
    }

    pub async fn toggle(&mut self) -> Result<Option<Generated>, GenError> {
        match self.state {
            RunState::Running => {
                self.pause();
                Ok(None)
            }
            RunState::Paused => self.resume().await,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    pub fn last_fingerprint(&self) -> Option<&Fingerprint> {
        self.last.as_ref()
    }

    pub fn saved_count(&self) -> u64 {
        self.saved
    }

    pub fn store(&self) -> &FingerprintStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FingerprintStore {
        &mut self.store
    }

    pub async fn status(&self) -> StatusReport {
        let db_size_bytes = match self.store.size_on_disk().await {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::debug!("database size unavailable: {e}");
                None
            }
        };
        StatusReport {
            connected: self.store.is_connected(),
            db_size_bytes,
            last_hash: self.last.clone(),
            known: self.store.len(),
            saved_this_session: self.saved,
            paused: self.is_paused(),
        }
    }

    /// Closes the backing store. The generator is consumed.
    pub async fn close(mut self) {
        self.store.close().await;
    }
}
