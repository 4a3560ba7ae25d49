//! Retained-mode widgets for e-ink displays.
//!
//! Widgets are cheap, immutable descriptions. Each one creates a long-lived
//! render object that caches its layout and only repaints, and reports,
//! the part of the screen that actually changed. The frame driver merges
//! those reports into one [`UpdateRegion`] per frame and picks the lightest
//! waveform that covers it.
//!
//! # Layers
//!
//! - [`geometry`], [`region`], [`canvas`]: sizes, update regions and the
//!   drawing surface.
//! - [`render`]: the render object protocol with its dirty flags.
//! - [`widget`], [`stateless`], [`stateful`], [`dynamic`]: describing
//!   trees and keeping render objects across rebuilds.
//! - [`widgets`]: the stock layout, text, input and navigation widgets.
//! - [`context`], [`app`]: timers, notifications and the frame loop.
//! - [`display`]: where finished frames go.
//!
//! # Example
//!
//! ```
//! use eink_ui::display::MemoryDisplay;
//! use eink_ui::widgets::{button, Flex, Text};
//! use eink_ui::{App, WidgetExt};
//! use embedded_graphics::prelude::Size;
//!
//! let page = Flex::column(vec![
//!     Text::new("Library").into_dynamic(),
//!     button("Open", |app| app.stop()).into_dynamic(),
//! ]);
//!
//! let mut display = MemoryDisplay::new(Size::new(300, 200));
//! let mut app = App::new(page);
//! let region = app.render_frame(&mut display)?;
//! assert!(!region.is_empty());
//! # Ok::<(), eink_ui::AppError>(())
//! ```

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing
    )
)]

pub mod app;
pub mod build;
pub mod canvas;
pub mod config;
pub mod context;
pub mod display;
pub mod dynamic;
pub mod error;
pub mod geometry;
pub mod region;
pub mod render;
pub mod stateful;
pub mod stateless;
pub mod widget;
pub mod widgets;

pub use app::{run_app, App};
pub use build::BuildContext;
pub use canvas::{Canvas, MemoryCanvas};
pub use config::AppConfig;
pub use context::{AppContext, Notifier, TimerHandle};
pub use display::{DisplayDriver, MemoryDisplay};
pub use dynamic::{DynamicWidget, WidgetExt};
pub use error::{AppError, DisplayError};
pub use geometry::{Constraints, Insets};
pub use region::{UpdateFlags, UpdateRegion, Waveform};
pub use render::{PaintState, RenderObject, RenderState};
pub use stateful::{BuildScope, State, StateHandle, Stateful, StatefulWidget};
pub use stateless::{Stateless, StatelessWidget};
pub use widget::Widget;

pub use eink_input;
