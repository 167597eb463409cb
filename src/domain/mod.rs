// Domain layer - Batch, album and series descriptions and timeline types

pub mod album;
pub mod model;
pub mod series;
