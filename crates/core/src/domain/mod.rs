pub mod features;
pub mod news;
pub mod price;
