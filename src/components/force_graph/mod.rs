//! Force-directed drawing of a graph session.
//!
//! [`ForceLayout`] is the [`crate::RenderPort`] implementation: it mirrors each
//! snapshot into a physics simulation and keeps the pan/zoom transform. With the
//! `web` feature, [`RelationGraphCanvas`] draws it on an HTML canvas with
//! dragging, panning, zooming and click-to-select.
//!
//! # Example
//!
//! ```ignore
//! let config = VizConfig::default();
//! let layout = ForceLayout::new(&config.layout, 800.0, 600.0);
//! let session = Rc::new(RefCell::new(GraphSession::new(layout, &config)));
//! session.borrow_mut().show(&result)?;
//!
//! view! { <RelationGraphCanvas session=session config=config fullscreen=true /> }
//! ```

#[cfg(feature = "web")]
mod component;
mod layout;
#[cfg(feature = "web")]
mod render;

#[cfg(feature = "web")]
pub use component::{RelationGraphCanvas, SharedSession};
pub use layout::{DragState, EdgeInfo, ForceLayout, MAX_ZOOM, MIN_ZOOM, NodeInfo, PanState, ViewTransform};
