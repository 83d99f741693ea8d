//! The graph view-model: identities, colors, the store, highlight modes and
//! the session tying them to a [`RenderPort`].

pub mod color;
pub mod highlight;
pub mod ident;
pub mod port;
pub mod session;
pub mod store;
pub mod types;

pub use color::{Color, ColorAssigner, ColorKey, Palette};
pub use highlight::{HighlightEngine, HighlightState};
pub use ident::IdentityCodec;
pub use port::{DomainStyle, EdgeStyle, NodeStyle, RenderPort, Styler};
pub use session::{GraphSession, Shown};
pub use store::{ApplyReport, GraphStore};
pub use types::{Delta, Detail, Edge, Node, NodeCategory, RelationType, Snapshot, StrengthTier};
