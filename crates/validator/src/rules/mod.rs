//! Custom atoms shipped with the engine.

pub mod cloud_image;
pub mod min_price;
pub mod photo_entry;

pub use cloud_image::{ValidCloudImage, rewrite_drive_url};
pub use min_price::{MinPriceByArea, format_amount};
pub use photo_entry::PhotoEntry;
