//! Binding and geometry engine for an infinite-canvas whiteboard scene.
//!
//! Keeps bindable shapes and the linear elements attached to them
//! consistent while either side is moved, resized, rotated, deleted or
//! duplicated. Hosts feed it gestures through [`engine::EngineCore`] and read
//! element geometry and bindings back from its [`store::Scene`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Gesture-level operations and the [`engine::EngineCore`] |
//! | [`store`] | Ordered element store and the mutation gateway |
//! | [`element`] | Element model, factories and sparse updates |
//! | [`binding`] | Binding candidates, focus and gap, bind/unbind strategies |
//! | [`bound`] | Keeps bound arrows and labels in step with their targets |
//! | [`elbow`] | Orthogonal routing for elbow arrows |
//! | [`text`] | Labels inside containers: wrapping, sizing, placement |
//! | [`container_cache`] | Container heights from before a label grew them |
//! | [`ordering`] | Z-order normalization for groups, labels and frames |
//! | [`frame`] | Frame membership and deletion |
//! | [`duplicate`] | Copies with remapped ids and bindings |
//! | [`linear`] | Point editing helpers for arrows and lines |
//! | [`collision`] | Distances to shapes and binding thresholds |
//! | [`heading`] | Axis headings |
//! | [`geometry`] | Points, boxes and segment math |
//! | [`camera`] | Pan/zoom and coordinate conversion |
//! | [`input`] | Keys, modifiers, resize handles and gesture state |
//! | [`config`] | Engine configuration and environment overrides |
//! | [`error`] | Crate error type |
//! | [`consts`] | Shared numeric constants |

pub mod binding;
pub mod bound;
pub mod camera;
pub mod collision;
pub mod config;
pub mod consts;
pub mod container_cache;
pub mod duplicate;
pub mod elbow;
pub mod element;
pub mod engine;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod heading;
pub mod input;
pub mod linear;
pub mod ordering;
pub mod store;
pub mod text;
