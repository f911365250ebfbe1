//! Chart lifecycle management.
//!
//! A [`ChartHandle`] owns at most one live drawing surface bound to a
//! rendering target. Every update disposes the previous surface before the
//! next one is constructed, and the handle disposes whatever is live when it
//! is released or dropped.
//!
//! Drawing itself is delegated to a [`ChartBackend`], which only needs to
//! construct and destroy surfaces:
//!
//! - [`terminal::TerminalBackend`] renders stacked bars as colored text
//! - [`svg::SvgBackend`] renders a grouped bar chart as SVG markup
//!
//! ```text
//! Unattached ──update──▶ Attached(s1) ──update──▶ Attached(s2) ──release──▶ Disposed
//!                         (s1 destroyed before s2 is built)
//! ```

pub mod svg;
pub mod terminal;

use anyhow::Result;

use crate::series::{ChartOptions, ChartSeries};

// ---------------------------------------------------------------------------
// Backend capability
// ---------------------------------------------------------------------------

/// Construct/destroy capability of a drawing library.
pub trait ChartBackend {
    /// Where surfaces are drawn (a terminal region, an SVG viewport, ...).
    type Target;
    /// One rendered chart instance.
    type Surface;

    /// Build a surface for `series` on `target`.
    fn construct(
        &mut self,
        target: &Self::Target,
        series: &ChartSeries,
        options: &ChartOptions,
    ) -> Result<Self::Surface>;

    /// Dispose a surface. Called exactly once per constructed surface.
    ///
    /// Backends whose surfaces are plain owned values release them by
    /// dropping; ones holding external resources free them here.
    fn destroy(&mut self, surface: Self::Surface);
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Lifecycle phase of a [`ChartHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Bound to a target, no surface built yet.
    Unattached,
    /// One live surface.
    Attached,
    /// Released. Terminal.
    Disposed,
}

enum SurfaceState<S> {
    Unattached,
    Attached(S),
    Disposed,
}

/// Owning handle over one drawing surface.
pub struct ChartHandle<B: ChartBackend> {
    backend: B,
    target: B::Target,
    state: SurfaceState<B::Surface>,
    /// Inputs of the live surface, used by [`refresh`](Self::refresh).
    built_from: Option<(ChartSeries, ChartOptions)>,
    rebuilds: usize,
}

impl<B: ChartBackend> ChartHandle<B> {
    /// Bind a backend to a rendering target. No surface exists until the
    /// first [`update`](Self::update).
    pub fn attach(backend: B, target: B::Target) -> Self {
        Self {
            backend,
            target,
            state: SurfaceState::Unattached,
            built_from: None,
            rebuilds: 0,
        }
    }

    /// Rebuild the surface from `series` and `options`.
    ///
    /// The previous surface, if any, is destroyed first. A no-op on a
    /// released handle. If construction fails the handle is left without a
    /// surface and the error is returned.
    pub fn update(&mut self, series: &ChartSeries, options: &ChartOptions) -> Result<()> {
        if matches!(self.state, SurfaceState::Disposed) {
            return Ok(());
        }

        if let SurfaceState::Attached(old) =
            std::mem::replace(&mut self.state, SurfaceState::Unattached)
        {
            self.backend.destroy(old);
        }
        self.built_from = None;

        let surface = self.backend.construct(&self.target, series, options)?;
        self.state = SurfaceState::Attached(surface);
        self.built_from = Some((series.clone(), options.clone()));
        self.rebuilds += 1;
        Ok(())
    }

    /// Rebuild only if the inputs differ from those of the live surface.
    ///
    /// Returns `true` when a rebuild happened.
    pub fn refresh(&mut self, series: &ChartSeries, options: &ChartOptions) -> Result<bool> {
        if matches!(self.state, SurfaceState::Disposed) {
            return Ok(false);
        }
        let current = self
            .built_from
            .as_ref()
            .is_some_and(|(s, o)| s == series && o == options);
        if current && self.is_live() {
            return Ok(false);
        }
        self.update(series, options)?;
        Ok(true)
    }

    /// Destroy the live surface, if any, and move to [`Phase::Disposed`].
    ///
    /// Safe to call any number of times.
    pub fn release(&mut self) {
        if let SurfaceState::Attached(surface) =
            std::mem::replace(&mut self.state, SurfaceState::Disposed)
        {
            self.backend.destroy(surface);
        }
        self.built_from = None;
    }

    /// Destroy the live surface but keep the handle usable.
    pub fn clear(&mut self) {
        match std::mem::replace(&mut self.state, SurfaceState::Unattached) {
            SurfaceState::Attached(surface) => self.backend.destroy(surface),
            SurfaceState::Disposed => {
                self.state = SurfaceState::Disposed;
                return;
            }
            SurfaceState::Unattached => {}
        }
        self.built_from = None;
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            SurfaceState::Unattached => Phase::Unattached,
            SurfaceState::Attached(_) => Phase::Attached,
            SurfaceState::Disposed => Phase::Disposed,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.state, SurfaceState::Attached(_))
    }

    /// The live surface, if any.
    pub fn surface(&self) -> Option<&B::Surface> {
        match &self.state {
            SurfaceState::Attached(surface) => Some(surface),
            _ => None,
        }
    }

    pub fn target(&self) -> &B::Target {
        &self.target
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of surfaces built over the handle's lifetime.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }
}

impl<B: ChartBackend> Drop for ChartHandle<B> {
    fn drop(&mut self) {
        self.release();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts live surfaces instead of drawing.
    #[derive(Default)]
    struct Counting {
        live: usize,
        built: usize,
        destroyed: Vec<usize>,
        fail_next: bool,
    }

    impl ChartBackend for Counting {
        type Target = ();
        type Surface = usize;

        fn construct(&mut self, _: &(), _: &ChartSeries, _: &ChartOptions) -> Result<usize> {
            if self.fail_next {
                self.fail_next = false;
                anyhow::bail!("backend unavailable");
            }
            self.built += 1;
            self.live += 1;
            Ok(self.built)
        }

        fn destroy(&mut self, surface: usize) {
            self.live -= 1;
            self.destroyed.push(surface);
        }
    }

    fn series(n: i64) -> ChartSeries {
        ChartSeries {
            labels: vec!["d1".to_string()],
            datasets: vec![crate::series::SeriesDataset {
                category: "Commits".to_string(),
                color: "#000".to_string(),
                values: vec![n],
            }],
        }
    }

    #[test]
    fn update_replaces_surface() {
        let mut handle = ChartHandle::attach(Counting::default(), ());
        assert_eq!(handle.phase(), Phase::Unattached);

        handle.update(&series(1), &ChartOptions::default()).unwrap();
        handle.update(&series(2), &ChartOptions::default()).unwrap();

        assert_eq!(handle.backend().live, 1);
        assert_eq!(handle.backend().destroyed, vec![1]);
        assert_eq!(handle.surface(), Some(&2));
        assert_eq!(handle.rebuilds(), 2);
    }

    #[test]
    fn release_is_idempotent() {
        let mut handle = ChartHandle::attach(Counting::default(), ());
        handle.update(&series(1), &ChartOptions::default()).unwrap();
        handle.release();
        handle.release();
        assert_eq!(handle.phase(), Phase::Disposed);
        assert_eq!(handle.backend().live, 0);
        assert_eq!(handle.backend().destroyed, vec![1]);
    }

    #[test]
    fn update_after_release_is_noop() {
        let mut handle = ChartHandle::attach(Counting::default(), ());
        handle.release();
        handle.update(&series(1), &ChartOptions::default()).unwrap();
        assert_eq!(handle.phase(), Phase::Disposed);
        assert_eq!(handle.backend().built, 0);
    }

    #[test]
    fn failed_construct_leaves_no_surface() {
        let mut handle = ChartHandle::attach(Counting::default(), ());
        handle.update(&series(1), &ChartOptions::default()).unwrap();
        handle.backend.fail_next = true;

        assert!(handle.update(&series(2), &ChartOptions::default()).is_err());
        assert_eq!(handle.phase(), Phase::Unattached);
        assert_eq!(handle.backend().live, 0);

        handle.update(&series(3), &ChartOptions::default()).unwrap();
        assert_eq!(handle.backend().live, 1);
    }

    #[test]
    fn refresh_skips_unchanged_inputs() {
        let mut handle = ChartHandle::attach(Counting::default(), ());
        let opts = ChartOptions::default();
        assert!(handle.refresh(&series(1), &opts).unwrap());
        assert!(!handle.refresh(&series(1), &opts).unwrap());
        assert!(handle.refresh(&series(2), &opts).unwrap());

        let mut other = opts.clone();
        other.show_legend = true;
        assert!(handle.refresh(&series(2), &other).unwrap());
        assert_eq!(handle.backend().live, 1);
        assert_eq!(handle.rebuilds(), 3);
    }

    #[test]
    fn clear_keeps_handle_usable() {
        let mut handle = ChartHandle::attach(Counting::default(), ());
        handle.update(&series(1), &ChartOptions::default()).unwrap();
        handle.clear();
        assert_eq!(handle.phase(), Phase::Unattached);
        assert_eq!(handle.backend().live, 0);
        handle.update(&series(1), &ChartOptions::default()).unwrap();
        assert!(handle.is_live());
    }
}
