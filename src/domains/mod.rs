//! Domains with a native solver.
//!
//! Each domain here mirrors one of the bundled programs in `asp/` so the
//! engine can be exercised without an external solver.

pub mod blocks_world;

pub use blocks_world::BlocksWorld;
