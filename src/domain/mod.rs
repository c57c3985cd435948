//! Nexus Domain Records
//!
//! The records each dashboard slice holds:
//!
//! - **WeatherRecord**: current conditions for one city, keyed by city name
//! - **CryptoRecord**: market snapshot for one coin, keyed by coin id
//! - **NewsRecord**: one headline, keyed by article id
//!
//! Every record implements [`Keyed`], which is how slices identify records for
//! favorites and partitioning.

pub mod types;

pub use types::{CryptoRecord, Keyed, NewsRecord, SliceKind, WeatherRecord};
