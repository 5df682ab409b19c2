//! Static assets loaded once and shared read-only by every render

use futures::future::try_join_all;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use super::repository::ImageRepository;
use crate::config::AssetManifest;
use crate::draw::Typeface;
use crate::error::ResolutionError;
use crate::mode::{Backdrop, GameMode};
use crate::models::Rating;

/// Height every medal, cycle and boss icon is normalized to.
pub const ICON_HEIGHT: u32 = 50;
/// Width of the header rating icons.
pub const RATING_LARGE_WIDTH: u32 = 80;
/// Height of the per-section rating badge.
pub const RATING_SMALL_HEIGHT: u32 = 50;

/// Identifies one static bitmap in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetId {
    MedalLit,
    /// Derived from the lit medal
    MedalUnlit,
    CycleIcon,
    BossCheck,
    RatingLarge(Rating),
    RatingSmall(Rating),
    /// Background plate with the mode's backdrop treatment applied
    Background(GameMode),
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::MedalLit => write!(f, "medal (lit)"),
            AssetId::MedalUnlit => write!(f, "medal (unlit)"),
            AssetId::CycleIcon => write!(f, "cycle icon"),
            AssetId::BossCheck => write!(f, "boss check"),
            AssetId::RatingLarge(r) => write!(f, "rating {} (large)", r),
            AssetId::RatingSmall(r) => write!(f, "rating {} (small)", r),
            AssetId::Background(mode) => write!(f, "{} background", mode),
        }
    }
}

/// Immutable set of decoded static assets plus the text typeface.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    images: BTreeMap<AssetId, RgbaImage>,
    typeface: Typeface,
}

/// What a fetched static key becomes once decoded.
#[derive(Debug, Clone, Copy)]
enum Source {
    Medal,
    Cycle,
    Boss,
    Rating(Rating),
    Background(GameMode),
}

impl AssetStore {
    /// A store with no bitmaps and the built-in pixel font.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace one bitmap.
    pub fn with_image(mut self, id: AssetId, image: RgbaImage) -> Self {
        self.images.insert(id, image);
        self
    }

    pub fn with_typeface(mut self, typeface: Typeface) -> Self {
        self.typeface = typeface;
        self
    }

    pub fn image(&self, id: AssetId) -> Option<&RgbaImage> {
        self.images.get(&id)
    }

    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Fetch, decode and derive every static asset named by the manifest.
    ///
    /// Fetches run concurrently; decoding runs on the rayon pool. The first
    /// failing key aborts the load.
    pub async fn load(
        repo: &dyn ImageRepository,
        manifest: &AssetManifest,
    ) -> Result<Self, ResolutionError> {
        let mut jobs: Vec<(Source, &str)> = vec![
            (Source::Medal, manifest.medal.as_str()),
            (Source::Cycle, manifest.cycle_icon.as_str()),
            (Source::Boss, manifest.boss_check.as_str()),
            (Source::Rating(Rating::S), manifest.rating_s.as_str()),
            (Source::Rating(Rating::A), manifest.rating_a.as_str()),
            (Source::Rating(Rating::B), manifest.rating_b.as_str()),
        ];
        jobs.extend(
            GameMode::ALL
                .iter()
                .map(|&mode| (Source::Background(mode), manifest.background(mode))),
        );

        let fetched = try_join_all(jobs.into_iter().map(|(source, key)| async move {
            repo.open_stream(key)
                .await
                .map(|bytes| (source, key.to_string(), bytes))
                .map_err(|e| ResolutionError::Fetch {
                    key: key.to_string(),
                    source: e,
                })
        }))
        .await?;
        debug!(count = fetched.len(), "fetched static assets");

        let decoded = decode_batch(fetched).await?;

        let mut store = AssetStore::empty();
        for (source, image) in decoded {
            store.insert_derived(source, image);
        }

        if let Some(key) = &manifest.font {
            let bytes = repo.open_stream(key).await.map_err(|e| ResolutionError::Fetch {
                key: key.clone(),
                source: e,
            })?;
            let typeface = Typeface::from_bytes(bytes)
                .ok_or_else(|| ResolutionError::Font { key: key.clone() })?;
            store.typeface = typeface;
        }

        info!(
            assets = store.len(),
            outline_font = !store.typeface.is_pixel(),
            "static assets loaded"
        );
        Ok(store)
    }

    fn insert_derived(&mut self, source: Source, image: RgbaImage) {
        match source {
            Source::Medal => {
                let lit = fit_height(&image, ICON_HEIGHT);
                let mut unlit = grayscale(&lit);
                brighten(&mut unlit, 7, 10);
                self.images.insert(AssetId::MedalLit, lit);
                self.images.insert(AssetId::MedalUnlit, unlit);
            }
            Source::Cycle => {
                self.images.insert(AssetId::CycleIcon, fit_height(&image, ICON_HEIGHT));
            }
            Source::Boss => {
                self.images.insert(AssetId::BossCheck, fit_height(&image, ICON_HEIGHT));
            }
            Source::Rating(rating) => {
                self.images
                    .insert(AssetId::RatingLarge(rating), fit_width(&image, RATING_LARGE_WIDTH));
                self.images
                    .insert(AssetId::RatingSmall(rating), fit_height(&image, RATING_SMALL_HEIGHT));
            }
            Source::Background(mode) => {
                let plate = match mode.profile().backdrop {
                    Backdrop::Plain => image,
                    Backdrop::Dimmed => {
                        let mut img = image;
                        brighten(&mut img, 1, 2);
                        img
                    }
                    Backdrop::DimmedBlurred => {
                        let mut img = image;
                        brighten(&mut img, 1, 2);
                        imageops::blur(&img, 5.0)
                    }
                };
                self.images.insert(AssetId::Background(mode), plate);
            }
        }
    }
}

/// Decode fetched `(tag, key, bytes)` triples on the rayon pool.
///
/// Runs under `spawn_blocking` so the calling runtime worker stays free.
/// Output keeps the input order; the first undecodable key fails the batch.
pub async fn decode_batch<T: Send + 'static>(
    fetched: Vec<(T, String, Vec<u8>)>,
) -> Result<Vec<(T, RgbaImage)>, ResolutionError> {
    tokio::task::spawn_blocking(move || {
        fetched
            .into_par_iter()
            .map(|(tag, key, bytes)| {
                image::load_from_memory(&bytes)
                    .map(|img| (tag, img.to_rgba8()))
                    .map_err(|source| ResolutionError::Decode { key, source })
            })
            .collect::<Result<Vec<_>, _>>()
    })
    .await?
}

/// Resize to `width`, keeping the aspect ratio.
pub fn fit_width(image: &RgbaImage, width: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return RgbaImage::new(width, width);
    }
    let height = ((h as u64 * width as u64 + w as u64 / 2) / w as u64).max(1) as u32;
    imageops::resize(image, width, height, FilterType::CatmullRom)
}

/// Resize to `height`, keeping the aspect ratio.
pub fn fit_height(image: &RgbaImage, height: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return RgbaImage::new(height, height);
    }
    let width = ((w as u64 * height as u64 + h as u64 / 2) / h as u64).max(1) as u32;
    imageops::resize(image, width, height, FilterType::CatmullRom)
}

/// Scale to cover `width` x `height`, then crop the centre.
pub fn cover(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return RgbaImage::new(width, height);
    }
    // Pick the larger scale so both dimensions are covered
    let (scaled_w, scaled_h) = if w as u64 * height as u64 >= h as u64 * width as u64 {
        let sw = ((w as u64 * height as u64 + h as u64 - 1) / h as u64) as u32;
        (sw.max(width), height)
    } else {
        let sh = ((h as u64 * width as u64 + w as u64 - 1) / w as u64) as u32;
        (width, sh.max(height))
    };
    let scaled = imageops::resize(image, scaled_w, scaled_h, FilterType::CatmullRom);
    let x = (scaled_w - width) / 2;
    let y = (scaled_h - height) / 2;
    imageops::crop_imm(&scaled, x, y, width, height).to_image()
}

/// Luma-only copy, alpha preserved.
pub fn grayscale(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let luma = ((r as u32 * 2126 + g as u32 * 7152 + b as u32 * 722) / 10000) as u8;
        *pixel = Rgba([luma, luma, luma, a]);
    }
    out
}

/// Multiply colour channels by `num / den`, alpha untouched.
pub fn brighten(image: &mut RgbaImage, num: u32, den: u32) {
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            *channel = (*channel as u32 * num / den).min(255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_keeps_aspect() {
        let img = RgbaImage::new(200, 100);
        assert_eq!(fit_width(&img, 80).dimensions(), (80, 40));
        assert_eq!(fit_height(&img, 50).dimensions(), (100, 50));
    }

    #[test]
    fn test_cover_exact_size() {
        let wide = RgbaImage::new(400, 100);
        assert_eq!(cover(&wide, 150, 150).dimensions(), (150, 150));
        let tall = RgbaImage::new(90, 300);
        assert_eq!(cover(&tall, 155, 138).dimensions(), (155, 138));
    }

    #[test]
    fn test_unlit_medal_is_gray_and_darker() {
        let lit = RgbaImage::from_pixel(10, 10, Rgba([255, 200, 0, 255]));
        let mut unlit = grayscale(&lit);
        brighten(&mut unlit, 7, 10);
        let p = unlit.get_pixel(0, 0);
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
        assert!(p[0] < 200);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_derived_assets() {
        let mut store = AssetStore::empty();
        store.insert_derived(Source::Medal, RgbaImage::from_pixel(64, 64, Rgba([255, 0, 0, 255])));
        store.insert_derived(Source::Rating(Rating::A), RgbaImage::new(160, 100));

        assert_eq!(store.image(AssetId::MedalLit).unwrap().dimensions(), (50, 50));
        assert!(store.image(AssetId::MedalUnlit).is_some());
        assert_eq!(store.image(AssetId::RatingLarge(Rating::A)).unwrap().width(), 80);
        assert_eq!(store.image(AssetId::RatingSmall(Rating::A)).unwrap().height(), 50);
        assert!(store.image(AssetId::RatingLarge(Rating::S)).is_none());
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        RgbaImage::new(w, h)
            .write_to(&mut out, image::ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_decode_batch_keeps_input_order() {
        let fetched = (1..=6u32)
            .map(|i| (i, format!("key_{i}"), png(i, 1)))
            .collect();
        let decoded = decode_batch(fetched).await.unwrap();
        let widths: Vec<_> = decoded.iter().map(|(tag, img)| (*tag, img.width())).collect();
        assert_eq!(widths, vec![(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6)]);
    }

    #[tokio::test]
    async fn test_decode_batch_names_the_bad_key() {
        let fetched = vec![
            (0u8, "ok".to_string(), png(2, 2)),
            (1, "junk".to_string(), vec![1, 2, 3]),
        ];
        let err = decode_batch(fetched).await.unwrap_err();
        assert!(matches!(err, ResolutionError::Decode { ref key, .. } if key == "junk"));
    }

    #[test]
    fn test_backdrop_dims_background() {
        let mut store = AssetStore::empty();
        let plate = RgbaImage::from_pixel(20, 20, Rgba([200, 100, 50, 255]));
        store.insert_derived(Source::Background(GameMode::PureFiction), plate.clone());
        store.insert_derived(Source::Background(GameMode::ShiyuDefense), plate);

        let pf = store.image(AssetId::Background(GameMode::PureFiction)).unwrap();
        assert_eq!(*pf.get_pixel(5, 5), Rgba([100, 50, 25, 255]));
        let shiyu = store.image(AssetId::Background(GameMode::ShiyuDefense)).unwrap();
        assert_eq!(*shiyu.get_pixel(5, 5), Rgba([200, 100, 50, 255]));
    }
}
