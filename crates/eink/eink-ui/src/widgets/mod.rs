//! Stock widgets.
//!
//! # Components
//!
//! - Leaves: [`Colored`], [`Text`], [`Image`]
//! - Single child: [`Padding`], [`Border`], [`Sized`], [`Center`],
//!   [`Cleared`], [`Hideable`], [`GestureDetector`]
//! - Multiple children: [`Flex`], [`Wrap`], [`Stack`]
//! - Composites: [`container`], [`button`], [`Navigator`]

mod basic;
mod detector;
mod flex;
mod hideable;
mod layout;
mod navigator;
mod stack;
mod wrap;

pub use basic::{
    Cleared, ClearedRenderObject, Colored, ColoredRenderObject, Image, ImageRenderObject, Text,
    TextRenderObject,
};
pub use detector::{button, Button, GestureDetector, GestureDetectorRenderObject, Gestures};
pub use flex::{Axis, Flex, FlexRenderObject};
pub use hideable::{Hideable, HideableRenderObject};
pub use layout::{
    container, Border, BorderRenderObject, Center, CenterRenderObject, Container, Padding,
    PaddingRenderObject, Sized, SizedRenderObject,
};
pub use navigator::{Navigator, NavigatorHandle, NavigatorState, OverlayEntry};
pub use stack::{Stack, StackRenderObject};
pub use wrap::{Wrap, WrapRenderObject};
