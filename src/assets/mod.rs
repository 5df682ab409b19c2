//! Static assets and the repository they are fetched from

mod repository;
mod store;

pub use repository::{DirectoryRepository, ImageRepository, RepositoryError};
pub use store::{
    brighten, cover, decode_batch, fit_height, fit_width, grayscale, AssetId, AssetStore,
    ICON_HEIGHT, RATING_LARGE_WIDTH, RATING_SMALL_HEIGHT,
};
