mod id;
mod io;
mod layer;

pub use id::ZoneId;
pub use layer::{PointLayer, PolygonLayer};
