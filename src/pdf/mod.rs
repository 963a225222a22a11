pub mod access;
pub mod extractors;
pub mod normalize;
pub mod reconstruct;
