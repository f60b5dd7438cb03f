//! Navigation controller: validated page jumps over the surface cache

use std::sync::Arc;

use log::debug;

use crate::cache::{Surface, SurfaceCache};
use crate::document::PageSource;
use crate::error::ViewerError;
use crate::render::Transform;

/// What the controller is currently presenting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavState {
    /// Nothing shown yet; initial state before the first navigation.
    Idle,
    /// Page `index` is the visible page.
    Showing(usize),
}

/// Parse a 1-based page entry from the host into a 0-based index.
///
/// Returns `None` for anything that is not a number >= 1, including `"0"`,
/// negative entries, and empty input.
#[must_use]
pub fn parse_page_entry(entry: &str) -> Option<usize> {
    let number: usize = entry.trim().parse().ok()?;
    number.checked_sub(1)
}

/// Tracks the visible page and mediates every page request against the
/// document bounds. Rejected requests never change `NavState` or the cache.
pub struct NavController<S> {
    cache: Arc<SurfaceCache<S>>,
    state: NavState,
}

impl<S: PageSource> NavController<S> {
    pub fn new(cache: Arc<SurfaceCache<S>>) -> Self {
        Self {
            cache,
            state: NavState::Idle,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            NavState::Idle => None,
            NavState::Showing(index) => Some(index),
        }
    }

    pub fn page_count(&self) -> usize {
        self.cache.page_count()
    }

    pub fn cache(&self) -> &Arc<SurfaceCache<S>> {
        &self.cache
    }

    /// Jump to `index`. Out-of-range requests and rasterization failures
    /// leave the current state untouched.
    pub fn go_to(&mut self, index: usize) -> Result<Arc<Surface>, ViewerError> {
        let page_count = self.cache.page_count();
        if index >= page_count {
            return Err(ViewerError::IndexOutOfRange { index, page_count });
        }
        let surface = self.cache.get(index)?;
        self.state = NavState::Showing(index);
        debug!("showing page {index}");
        Ok(surface)
    }

    /// Advance one page, clamped at the last page. From `Idle`, shows the
    /// first page.
    pub fn next_page(&mut self) -> Result<Arc<Surface>, ViewerError> {
        let last = self.page_count().saturating_sub(1);
        let target = match self.state {
            NavState::Idle => 0,
            NavState::Showing(index) => (index + 1).min(last),
        };
        self.go_to(target)
    }

    /// Go back one page, clamped at the first page. From `Idle`, shows the
    /// first page.
    pub fn previous_page(&mut self) -> Result<Arc<Surface>, ViewerError> {
        let target = match self.state {
            NavState::Idle => 0,
            NavState::Showing(index) => index.saturating_sub(1),
        };
        self.go_to(target)
    }

    pub fn first_page(&mut self) -> Result<Arc<Surface>, ViewerError> {
        self.go_to(0)
    }

    pub fn last_page(&mut self) -> Result<Arc<Surface>, ViewerError> {
        self.go_to(self.page_count().saturating_sub(1))
    }

    /// Jump from a raw 1-based page entry typed by the user. Non-numeric or
    /// zero entries are rejected at this boundary; numeric entries past the
    /// end are rejected by [`NavController::go_to`].
    pub fn jump_to_entry(&mut self, entry: &str) -> Result<Arc<Surface>, ViewerError> {
        let index = parse_page_entry(entry).ok_or_else(|| ViewerError::InvalidPageEntry {
            entry: entry.to_string(),
            page_count: self.page_count(),
        })?;
        self.go_to(index)
    }

    /// Build every page eagerly and return the surfaces in index order, for
    /// the continuous-scroll presentation. Leaves `Showing(0)` when called
    /// from `Idle` on a non-empty document.
    pub fn surfaces_in_order(&mut self) -> Result<Vec<Arc<Surface>>, ViewerError> {
        let surfaces = (0..self.page_count())
            .map(|index| self.cache.get(index))
            .collect::<Result<Vec<_>, _>>()?;
        if self.state == NavState::Idle && !surfaces.is_empty() {
            self.state = NavState::Showing(0);
        }
        Ok(surfaces)
    }

    /// Record which page is nearest a relative scroll offset in `[0, 1]`,
    /// keeping one canonical navigation state across both view modes.
    pub fn note_scroll_offset(&mut self, fraction: f32) {
        let page_count = self.page_count();
        if page_count == 0 {
            return;
        }
        let clamped = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let index = (clamped * (page_count - 1) as f32).round() as usize;
        self.state = NavState::Showing(index.min(page_count - 1));
    }

    /// Change the document transform; all cached surfaces are discarded and
    /// the current page, if any, is rebuilt at the new scale.
    pub fn set_transform(
        &mut self,
        transform: Transform,
    ) -> Result<Option<Arc<Surface>>, ViewerError> {
        self.cache.set_transform(transform)?;
        self.current_surface()
    }

    /// Surface for the page currently shown, rebuilt on demand.
    pub fn current_surface(&mut self) -> Result<Option<Arc<Surface>>, ViewerError> {
        match self.state {
            NavState::Idle => Ok(None),
            NavState::Showing(index) => self.cache.get(index).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::testing::FakeSource;

    fn controller(pages: usize) -> NavController<FakeSource> {
        NavController::new(Arc::new(SurfaceCache::new(FakeSource::with_pages(pages))))
    }

    #[test]
    fn starts_idle_and_shows_after_first_jump() {
        let mut nav = controller(5);
        assert_eq!(nav.state(), NavState::Idle);
        assert_eq!(nav.current_index(), None);

        nav.go_to(0).unwrap();
        assert_eq!(nav.state(), NavState::Showing(0));
    }

    #[test]
    fn jumps_within_bounds_and_rejects_past_the_end() {
        let mut nav = controller(5);

        nav.go_to(0).unwrap();
        assert_eq!(nav.state(), NavState::Showing(0));

        nav.go_to(4).unwrap();
        assert_eq!(nav.state(), NavState::Showing(4));

        let rejected = nav.go_to(5);
        assert!(matches!(
            rejected,
            Err(ViewerError::IndexOutOfRange {
                index: 5,
                page_count: 5
            })
        ));
        assert_eq!(nav.state(), NavState::Showing(4));
    }

    #[test]
    fn next_and_previous_clamp_at_the_boundaries() {
        let mut nav = controller(3);

        nav.go_to(2).unwrap();
        nav.next_page().unwrap();
        assert_eq!(nav.state(), NavState::Showing(2));

        nav.go_to(0).unwrap();
        nav.previous_page().unwrap();
        assert_eq!(nav.state(), NavState::Showing(0));
    }

    #[test]
    fn stepping_from_idle_shows_the_first_page() {
        let mut nav = controller(3);
        nav.next_page().unwrap();
        assert_eq!(nav.state(), NavState::Showing(0));

        let mut nav = controller(3);
        nav.previous_page().unwrap();
        assert_eq!(nav.state(), NavState::Showing(0));
    }

    #[test]
    fn first_and_last_jump_to_the_document_edges() {
        let mut nav = controller(7);
        nav.last_page().unwrap();
        assert_eq!(nav.state(), NavState::Showing(6));
        nav.first_page().unwrap();
        assert_eq!(nav.state(), NavState::Showing(0));
    }

    #[test]
    fn page_entries_parse_one_based() {
        assert_eq!(parse_page_entry("1"), Some(0));
        assert_eq!(parse_page_entry(" 12 "), Some(11));
        assert_eq!(parse_page_entry("0"), None);
        assert_eq!(parse_page_entry("-1"), None);
        assert_eq!(parse_page_entry("abc"), None);
        assert_eq!(parse_page_entry(""), None);
    }

    #[test]
    fn bad_entries_are_rejected_without_changing_the_page() {
        let mut nav = controller(5);
        nav.go_to(2).unwrap();

        for entry in ["0", "-1", "abc"] {
            let rejected = nav.jump_to_entry(entry);
            assert!(matches!(
                rejected,
                Err(ViewerError::InvalidPageEntry { .. })
            ));
            assert_eq!(nav.state(), NavState::Showing(2));
        }

        // Numeric but past the end: rejected by bounds, not by parsing.
        assert!(matches!(
            nav.jump_to_entry("6"),
            Err(ViewerError::IndexOutOfRange { .. })
        ));
        assert_eq!(nav.state(), NavState::Showing(2));

        nav.jump_to_entry("5").unwrap();
        assert_eq!(nav.state(), NavState::Showing(4));
    }

    #[test]
    fn rasterization_failure_leaves_the_current_page_alone() {
        let mut source = FakeSource::with_pages(4);
        source.failing.insert(3);
        let mut nav = NavController::new(Arc::new(SurfaceCache::new(source)));

        nav.go_to(1).unwrap();
        assert!(matches!(
            nav.go_to(3),
            Err(ViewerError::Rasterization { index: 3, .. })
        ));
        assert_eq!(nav.state(), NavState::Showing(1));
    }

    #[test]
    fn scroll_view_builds_every_page_in_order() {
        let mut nav = controller(4);
        let surfaces = nav.surfaces_in_order().unwrap();

        assert_eq!(surfaces.len(), 4);
        assert!(surfaces.iter().enumerate().all(|(i, s)| s.index() == i));
        assert_eq!(nav.state(), NavState::Showing(0));
        assert_eq!(nav.cache().source().calls(), 4);

        // A later jump reuses the eagerly built surfaces.
        nav.go_to(2).unwrap();
        assert_eq!(nav.cache().source().calls(), 4);
    }

    #[test]
    fn scroll_offset_tracks_the_nearest_page() {
        let mut nav = controller(5);
        nav.note_scroll_offset(0.0);
        assert_eq!(nav.state(), NavState::Showing(0));
        nav.note_scroll_offset(0.5);
        assert_eq!(nav.state(), NavState::Showing(2));
        nav.note_scroll_offset(1.0);
        assert_eq!(nav.state(), NavState::Showing(4));
        nav.note_scroll_offset(7.5);
        assert_eq!(nav.state(), NavState::Showing(4));
    }

    #[test]
    fn transform_change_rebuilds_the_visible_page() {
        let mut nav = controller(2);
        let before = nav.go_to(1).unwrap();
        assert_eq!((before.width(), before.height()), (612, 792));

        let after = nav
            .set_transform(Transform::uniform(2.0).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!((after.width(), after.height()), (1224, 1584));
        assert_eq!(nav.state(), NavState::Showing(1));
    }

    #[test]
    fn empty_document_rejects_every_navigation() {
        let mut nav = controller(0);
        assert!(nav.go_to(0).is_err());
        assert!(nav.next_page().is_err());
        assert!(nav.last_page().is_err());
        assert_eq!(nav.state(), NavState::Idle);
        assert!(nav.surfaces_in_order().unwrap().is_empty());
    }
}
