pub mod normalize;

pub use normalize::{news_date, parse_news_timestamp, parse_price_date, PRICE_DATE_FORMAT};
