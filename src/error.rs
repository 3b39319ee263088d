//! Error types surfaced to `main`. Construction-time failures (a hittable
//! with no bounding box, an empty scene) are reported and the process exits
//! non-zero; I/O failures wrap `std::io::Error` so `?` keeps working all the
//! way up through `anyhow`. An unknown `--scene` tag is rejected by clap's
//! `ValueEnum` at argument-parsing time, before any `RenderError` path is
//! reachable, so there is no "unknown scene" variant here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no bounding box available for {what} — cannot place it in a BVH")]
    MissingBoundingBox { what: &'static str },

    #[error("scene is empty — nothing to render")]
    EmptyScene,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
