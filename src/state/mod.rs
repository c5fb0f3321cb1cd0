//! State module for tracking page fetches
//!
//! # Components
//!
//! - `FetchState`: The states a single page fetch moves through
//! - `FetchTracker`: Attempt counting and retry budget on top of `FetchState`

mod fetch_state;

// Re-export main types
pub use fetch_state::{FetchState, FetchTracker};
