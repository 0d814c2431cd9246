#![doc = "Arealize public API"]
mod common;
mod engine;
mod interpolate;
mod zone;

#[doc(inline)]
pub use zone::{PointLayer, PolygonLayer, ZoneId};

#[doc(inline)]
pub use engine::{GeometryEngine, RTreeEngine};

#[doc(inline)]
pub use interpolate::{
    disaggregate_by_density, disaggregate_by_distance, write_output, DensityParams, Disaggregation,
    DistanceParams, SourceAggregate, TargetRecord,
};
