pub mod atomic;
pub mod feature_table;
pub mod scored_news;

pub use atomic::write_atomically;
