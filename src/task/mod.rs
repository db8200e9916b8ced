//! Background tasks owned by a cache engine.

pub(crate) mod sweeper;
