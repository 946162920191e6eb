//! Compute layer: the geometry and index algorithms behind a join.
//!
//! - `validation`: input checks for points, polygons, boxes and config
//! - `bbox`: polygon and point extents, join domain
//! - `quadtree`: the point quadtree and its build
//! - `join`: leaf/polygon candidate pairing
//! - `pip`: exact point-in-polygon refinement

pub mod bbox;
pub mod join;
pub mod pip;
pub mod quadtree;
pub mod validation;
