//! # quadjoin-types
//!
//! Core value types shared by the quadjoin spatial-join engine.
//!
//! - **Point types**: `TaggedPoint` (coordinates plus a stable source id)
//! - **Polygon types**: `RingPolygon` (ring 0 exterior, the rest holes)
//! - **Bounding boxes**: `BoundingBox2D`
//! - **Join records**: `CandidatePair`, `Containment`
//! - **Configuration**: `JoinConfig`, `ErrorPolicy`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use quadjoin_types::point::TaggedPoint;
//! use quadjoin_types::polygon::RingPolygon;
//!
//! let point = TaggedPoint::new(7, 5.0, 5.0);
//! let square = RingPolygon::from_exterior(
//!     1,
//!     vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)],
//! );
//! assert_eq!(point.id, 7);
//! assert_eq!(square.holes().len(), 0);
//! ```

pub mod bbox;
pub mod config;
pub mod join;
pub mod point;
pub mod polygon;

pub use geo;
