//! Page surface cache: one displayable surface per page index
//!
//! Surfaces are built lazily from the page source and kept for the life of
//! the document, so memory is bounded by `page_count x max page size`. The
//! arena is a fixed vector of slots indexed by page number. A slot marked
//! `Building` is owned by exactly one builder; every other caller waits on
//! the condvar instead of rasterizing the same page twice.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use crate::document::PageSource;
use crate::error::ViewerError;
use crate::render::{Page, Transform};

/// A displayable wrapper around one rasterized page.
///
/// Owned by the cache; callers hold an `Arc` that stays valid across
/// invalidation (the cache just stops handing it out).
pub struct Surface {
    page: Page,
    generation: u64,
}

impl Surface {
    pub fn index(&self) -> usize {
        self.page.index
    }

    pub fn width(&self) -> u32 {
        self.page.width
    }

    pub fn height(&self) -> u32 {
        self.page.height
    }

    /// RGB samples, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.page.pixels
    }

    /// Cache generation this surface was built under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The same samples with an opaque alpha channel, for hosts that only
    /// accept RGBA buffers.
    #[must_use]
    pub fn rgba_pixels(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.page.pixels.len() / 3 * 4);
        for rgb in self.page.pixels.chunks_exact(3) {
            rgba.extend_from_slice(rgb);
            rgba.push(0xFF);
        }
        rgba
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("page", &self.page)
            .field("generation", &self.generation)
            .finish()
    }
}

enum Slot {
    Empty,
    Building,
    Ready(Arc<Surface>),
}

struct CacheState {
    slots: Vec<Slot>,
    transform: Transform,
    generation: u64,
}

/// Arena of surfaces keyed by page index, built at most once each.
pub struct SurfaceCache<S> {
    source: S,
    state: Mutex<CacheState>,
    slot_changed: Condvar,
}

impl<S: PageSource> SurfaceCache<S> {
    pub fn new(source: S) -> Self {
        // Identity transform is always valid.
        Self::with_transform(source, Transform::IDENTITY)
            .unwrap_or_else(|_| unreachable!("identity transform is valid"))
    }

    pub fn with_transform(source: S, transform: Transform) -> Result<Self, ViewerError> {
        transform.validate()?;
        let slots = (0..source.page_count()).map(|_| Slot::Empty).collect();
        Ok(Self {
            source,
            state: Mutex::new(CacheState {
                slots,
                transform,
                generation: 0,
            }),
            slot_changed: Condvar::new(),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn page_count(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn transform(&self) -> Transform {
        self.lock().transform
    }

    /// Return the surface for `index`, building it if absent.
    ///
    /// Concurrent calls for the same index perform a single rasterization;
    /// late arrivals wait and receive the same `Arc`. A failed build resets
    /// the slot and propagates the error without touching other slots.
    pub fn get(&self, index: usize) -> Result<Arc<Surface>, ViewerError> {
        loop {
            let mut state = self.lock();
            if index >= state.slots.len() {
                return Err(ViewerError::IndexOutOfRange {
                    index,
                    page_count: state.slots.len(),
                });
            }

            loop {
                match &state.slots[index] {
                    Slot::Ready(surface) => return Ok(Arc::clone(surface)),
                    Slot::Building => state = self.wait(state),
                    Slot::Empty => break,
                }
            }

            state.slots[index] = Slot::Building;
            let generation = state.generation;
            let transform = state.transform;
            drop(state);

            let built = self.source.rasterize(index, transform);

            let mut state = self.lock();
            debug_assert!(matches!(state.slots[index], Slot::Building));
            match built {
                Ok(page) if state.generation == generation => {
                    let surface = Arc::new(Surface { page, generation });
                    state.slots[index] = Slot::Ready(Arc::clone(&surface));
                    self.slot_changed.notify_all();
                    return Ok(surface);
                }
                Ok(_) => {
                    // Invalidated mid-build; drop the stale frame and retry
                    // under the current transform.
                    state.slots[index] = Slot::Empty;
                    self.slot_changed.notify_all();
                    debug!("discarded stale build of page {index}");
                }
                Err(err) => {
                    state.slots[index] = Slot::Empty;
                    self.slot_changed.notify_all();
                    warn!("building surface for page {index} failed: {err}");
                    return Err(err);
                }
            }
        }
    }

    /// Discard every cached surface. In-flight builds from the old
    /// generation discard their result instead of overwriting fresh state.
    pub fn invalidate_all(&self) {
        let mut state = self.lock();
        state.generation += 1;
        let mut dropped = 0usize;
        for slot in &mut state.slots {
            if matches!(slot, Slot::Ready(_)) {
                *slot = Slot::Empty;
                dropped += 1;
            }
        }
        debug!("invalidated {dropped} cached surfaces");
    }

    /// Replace the document transform and discard all surfaces built under
    /// the old one.
    pub fn set_transform(&self, transform: Transform) -> Result<(), ViewerError> {
        transform.validate()?;
        let mut state = self.lock();
        state.transform = transform;
        state.generation += 1;
        for slot in &mut state.slots {
            if matches!(slot, Slot::Ready(_)) {
                *slot = Slot::Empty;
            }
        }
        Ok(())
    }

    /// Release one slot to bound memory. A slot mid-build is left alone;
    /// the finished surface can be evicted afterwards.
    pub fn evict(&self, index: usize) -> Result<(), ViewerError> {
        let mut state = self.lock();
        if index >= state.slots.len() {
            return Err(ViewerError::IndexOutOfRange {
                index,
                page_count: state.slots.len(),
            });
        }
        if matches!(state.slots[index], Slot::Ready(_)) {
            state.slots[index] = Slot::Empty;
        }
        Ok(())
    }

    /// Whether a ready surface is cached for `index`.
    pub fn is_cached(&self, index: usize) -> bool {
        matches!(self.lock().slots.get(index), Some(Slot::Ready(_)))
    }

    /// Number of ready surfaces currently held.
    pub fn cached_len(&self) -> usize {
        self.lock()
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, CacheState>) -> MutexGuard<'a, CacheState> {
        self.slot_changed
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }
}
