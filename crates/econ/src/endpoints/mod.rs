//! Per-endpoint valuation of the simulated herd.
//!
//! Each module prices one sale endpoint: calves sold at weaning, after a
//! backgrounding phase, as finished live cattle, or on a carcass grid.
//! All four produce the same quantity, average discounted net returns per
//! cow exposed over the priced window, so the dispatch in
//! [`crate::process_net_returns`] can treat them interchangeably.

pub mod background;
pub mod fatcattle;
pub mod slaughter;
pub mod weaning;
