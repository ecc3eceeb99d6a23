//! Generation pipeline around shape generators.
//!
//! The pipeline owns everything a generator does not: it checks the cache
//! before rendering, allocates the raster, lends the generator a canvas,
//! stores the result, and reports progress events. Generated rasters can be
//! run through a [`ColorMatrix`] the same way. When raster allocation
//! runs out of memory it clears the cache and retries a bounded number of
//! times.

pub mod cache;
pub mod events;
pub mod types;


pub use cache::{CacheStore, MemoryCacheStore};
pub use events::{EventSink, FilterEvent, LogEvents};
pub use types::{Bitmap, PipelineError};

use crate::config::Config;
use crate::draw::Paint;
use crate::filter::ColorMatrix;
use crate::shape::{CacheKey, ShapeGenerator};
use crate::storage::TempStorage;
use cairo::{Format, ImageSurface};
use log::{debug, info, warn};
use std::sync::Arc;

/// Abstraction over raster allocation.
pub trait SurfaceFactory: Send + Sync {
    fn create(&self, width: i32, height: i32) -> Result<ImageSurface, PipelineError>;
}

/// Bundle of collaborators used by the pipeline. Each can be mocked in tests.
#[derive(Clone)]
pub struct PipelineDependencies {
    pub cache: Arc<dyn CacheStore>,
    pub surfaces: Arc<dyn SurfaceFactory>,
}

impl Default for PipelineDependencies {
    fn default() -> Self {
        Self {
            cache: Arc::new(MemoryCacheStore::new()),
            surfaces: Arc::new(ImageSurfaceFactory),
        }
    }
}

struct ImageSurfaceFactory;

impl SurfaceFactory for ImageSurfaceFactory {
    fn create(&self, width: i32, height: i32) -> Result<ImageSurface, PipelineError> {
        Ok(ImageSurface::create(Format::ARgb32, width, height)?)
    }
}

/// Runtime knobs for the pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// How many times the cache is cleared to retry a failed allocation
    pub max_clear_retries: u32,
    /// Where generated rasters are extracted to, when enabled
    pub extract_to: Option<Arc<TempStorage>>,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_clear_retries: config.cache.clear_caches_max_retries,
            extract_to: config
                .extract
                .enabled
                .then(|| Arc::new(TempStorage::from_config(&config.extract))),
        }
    }
}

/// Drives generators through cache lookup, rendering and storage.
#[derive(Clone)]
pub struct Pipeline {
    dependencies: PipelineDependencies,
    options: PipelineOptions,
}

impl Pipeline {
    /// Creates a pipeline with an in-memory cache and Cairo image surfaces.
    pub fn new(options: PipelineOptions) -> Self {
        Self::with_dependencies(PipelineDependencies::default(), options)
    }

    /// Creates a pipeline with custom collaborators (useful for testing).
    pub fn with_dependencies(dependencies: PipelineDependencies, options: PipelineOptions) -> Self {
        Self {
            dependencies,
            options,
        }
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.dependencies.cache
    }

    /// Produces the raster for `generator`, from cache when possible.
    pub fn generate(
        &self,
        generator: &dyn ShapeGenerator,
        events: &dyn EventSink,
    ) -> Result<Arc<Bitmap>, PipelineError> {
        let key = generator.generate_cache_key();
        events.emit(FilterEvent::FilteringStart { key: key.clone() });

        if let Some(bitmap) = self.dependencies.cache.get(&key) {
            debug!("Cache hit for {} ({})", generator.name(), key);
            self.finish(key, &bitmap, true, events);
            return Ok(bitmap);
        }

        let bitmap = match self.render_with_retries(generator) {
            Ok(bitmap) => Arc::new(bitmap),
            Err(err) => {
                log::error!("{} failed: {}", generator.name(), err);
                events.emit(FilterEvent::FilteringError {
                    message: err.to_string(),
                });
                return Err(err);
            }
        };

        self.dependencies.cache.put(key.clone(), Arc::clone(&bitmap));
        info!(
            "Generated {}x{} raster with {}",
            bitmap.width(),
            bitmap.height(),
            generator.name()
        );
        self.finish(key, &bitmap, false, events);
        Ok(bitmap)
    }

    /// Runs `matrix` over `source`, cached under
    /// [`ColorMatrix::filtered_key`] of `source_key`.
    pub fn apply_filter(
        &self,
        source: &Bitmap,
        source_key: &CacheKey,
        matrix: &ColorMatrix,
        events: &dyn EventSink,
    ) -> Arc<Bitmap> {
        let key = matrix.filtered_key(source_key);
        events.emit(FilterEvent::FilteringStart { key: key.clone() });

        if let Some(bitmap) = self.dependencies.cache.get(&key) {
            debug!("Cache hit for color matrix ({})", key);
            self.finish(key, &bitmap, true, events);
            return bitmap;
        }

        let bitmap = Arc::new(matrix.apply(source));
        self.dependencies.cache.put(key.clone(), Arc::clone(&bitmap));
        info!(
            "Filtered {}x{} raster with color matrix",
            bitmap.width(),
            bitmap.height()
        );
        self.finish(key, &bitmap, false, events);
        bitmap
    }

    fn finish(&self, key: CacheKey, bitmap: &Bitmap, cache_hit: bool, events: &dyn EventSink) {
        events.emit(FilterEvent::FilteringFinish { key, cache_hit });
        if let Some(storage) = &self.options.extract_to {
            self.extract(bitmap, storage, events);
        }
    }

    fn render_with_retries(&self, generator: &dyn ShapeGenerator) -> Result<Bitmap, PipelineError> {
        let mut cleared = 0;
        loop {
            match self.render_once(generator) {
                Ok(bitmap) => return Ok(bitmap),
                Err(err) if err.is_allocation_failure() => {
                    if cleared >= self.options.max_clear_retries {
                        return Err(PipelineError::CacheExhausted { retries: cleared });
                    }
                    cleared += 1;
                    warn!(
                        "Raster allocation failed ({}), clearing caches (attempt {}/{})",
                        err, cleared, self.options.max_clear_retries
                    );
                    self.dependencies.cache.clear();
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn render_once(&self, generator: &dyn ShapeGenerator) -> Result<Bitmap, PipelineError> {
        let (width, height) = (generator.width(), generator.height());
        let invalid = || PipelineError::InvalidDimensions { width, height };
        let surface_width = i32::try_from(width).map_err(|_| invalid())?;
        let surface_height = i32::try_from(height).map_err(|_| invalid())?;
        if surface_width == 0 || surface_height == 0 {
            return Err(invalid());
        }

        let surface = self
            .dependencies
            .surfaces
            .create(surface_width, surface_height)?;
        {
            let mut ctx = cairo::Context::new(&surface)?;
            let mut paint = Paint::default();
            generator.render(&mut ctx, &mut paint);
        }

        Bitmap::from_surface(surface)
    }

    fn extract(&self, bitmap: &Bitmap, storage: &TempStorage, events: &dyn EventSink) {
        let written = bitmap
            .to_png()
            .map_err(anyhow::Error::from)
            .and_then(|png| storage.write_artifact(&png));

        match written {
            Ok(path) => events.emit(FilterEvent::ExtractImage { path }),
            Err(err) => warn!("Image extraction failed: {:#}", err),
        }
    }
}
