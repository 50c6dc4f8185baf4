//! Resource loaders for figure images
//!
//! Creating a figure never waits for its image. The request is queued as a
//! [`LoadRequest`] and completed by the scheduler at the start of the next
//! refresh, the same way a browser image fires `onload` between frames.
//!
//! # Load contract
//!
//! - success: the figure takes the image and, per axis, snaps to the image's
//!   natural size unless a script assigned that axis first
//! - failure: a warning is logged and a solid placeholder of the figure's
//!   current size stands in, so rendering never fails
//! - image swap: same contract; its [`Deferred`] resolves on success and
//!   rejects on failure or when the figure no longer exists
//!
//! Loads are not cancelled by `stop`/`reset`; a load whose figure has been
//! removed in the meantime is dropped on completion.

use crate::color::Color;
use crate::deferred::Deferred;
use crate::error::AssetError;
use crate::figure::{FigureId, FigureStore};
use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};

/// Backend-owned image, referenced by figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

/// A decoded image and its natural size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub handle: ImageHandle,
    pub width: u32,
    pub height: u32,
}

/// Creates images in a drawing backend's own texture space.
pub trait ImageSource {
    fn load_image(&mut self, path: &Path) -> Result<ImageInfo, AssetError>;

    /// Solid-colour image used when a real one cannot be loaded.
    fn placeholder_image(
        &mut self,
        width: u32,
        height: u32,
        color: Color,
    ) -> Result<ImageHandle, AssetError>;
}

/// Maps script asset paths onto the project directory.
///
/// Paths are relative to the asset root. A path that does not exist there is
/// retried under each fallback directory (`images/`, `sounds/` by default), so
/// scripts can write `"cat.png"` instead of `"images/cat.png"`.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    root: PathBuf,
    fallback_dirs: Vec<String>,
}

impl AssetResolver {
    pub fn new(root: impl Into<PathBuf>, fallback_dirs: Vec<String>) -> Self {
        AssetResolver {
            root: root.into(),
            fallback_dirs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a script path. Absolute paths and `..` components are refused.
    ///
    /// When the file exists nowhere, the root-relative path is returned and the
    /// loader reports it missing.
    pub fn resolve(&self, asset: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(asset.trim());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if asset.trim().is_empty() || escapes {
            return Err(AssetError::InvalidPath(asset.to_string()));
        }

        let direct = self.root.join(relative);
        if direct.exists() {
            return Ok(direct);
        }

        for dir in &self.fallback_dirs {
            let candidate = self.root.join(dir).join(relative);
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        Ok(direct)
    }
}

/// What happens when a queued load finishes.
#[derive(Debug)]
pub enum LoadKind {
    /// Initial image of a freshly created figure
    Create,
    /// Image swap requested by a script
    Swap(Deferred<()>),
}

#[derive(Debug)]
pub struct LoadRequest {
    pub figure: FigureId,
    pub asset: String,
    pub kind: LoadKind,
}

/// FIFO of image loads waiting for the next refresh.
#[derive(Debug, Default)]
pub struct PendingLoads {
    queue: VecDeque<LoadRequest>,
}

impl PendingLoads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: LoadRequest) {
        self.queue.push_back(request);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Completes every queued load against `images`.
    pub fn complete<S: ImageSource + ?Sized>(
        &mut self,
        figures: &mut FigureStore,
        images: &mut S,
        resolver: &AssetResolver,
        placeholder: Color,
    ) {
        while let Some(request) = self.queue.pop_front() {
            complete_one(request, figures, images, resolver, placeholder);
        }
    }
}

fn complete_one<S: ImageSource + ?Sized>(
    request: LoadRequest,
    figures: &mut FigureStore,
    images: &mut S,
    resolver: &AssetResolver,
    placeholder: Color,
) {
    let LoadRequest { figure, asset, kind } = request;

    if figures.get(figure).is_none() {
        log::debug!("dropping load of {} for removed figure {}", asset, figure);
        if let LoadKind::Swap(done) = kind {
            done.reject(AssetError::MissingFigure(figure.0));
        }
        return;
    }

    let loaded = resolver
        .resolve(&asset)
        .and_then(|path| images.load_image(&path));

    match loaded {
        Ok(info) => {
            if let Some(target) = figures.get_mut(figure) {
                target.apply_image(info);
            }
            if let LoadKind::Swap(done) = kind {
                done.resolve(());
            }
        }
        Err(err) => {
            log::warn!("Image could not be loaded: {} ({})", asset, err);
            use_placeholder(figures, figure, images, &asset, placeholder);
            if let LoadKind::Swap(done) = kind {
                done.reject(err);
            }
        }
    }
}

/// Stands a solid block of the figure's current size in for a failed image.
fn use_placeholder<S: ImageSource + ?Sized>(
    figures: &mut FigureStore,
    figure: FigureId,
    images: &mut S,
    asset: &str,
    placeholder: Color,
) {
    let Some(target) = figures.get_mut(figure) else {
        return;
    };
    let width = target.width().max(1.0).round() as u32;
    let height = target.height().max(1.0).round() as u32;
    match images.placeholder_image(width, height, placeholder) {
        Ok(handle) => target.image = Some(handle),
        Err(err) => log::warn!("Placeholder for {} failed: {}", asset, err),
    }
}
