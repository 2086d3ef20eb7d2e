//! Reception check-in.
//!
//! Each reception terminal runs a [`ScannerReducer`] in its own store. Tokens
//! arrive from a camera through a [`DecodeFeed`], from a keyboard-wedge
//! scanner, or typed by hand; all three end up as
//! [`ScannerAction::TokenSubmitted`].

pub mod feed;
pub mod reducer;
pub mod terminals;

pub use feed::{DecodeFeed, FeedOutcome};
pub use reducer::{
    ExhibitorOption, GuestCard, ScanPhase, ScannerAction, ScannerEnvironment, ScannerReducer,
    ScannerState, TokenSource,
};
pub use terminals::{CameraView, ScannerStore, TerminalError, TerminalRegistry, TerminalView};
