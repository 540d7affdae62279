//! # pixelfry
//!
//! The image pipeline behind a chat bot's `/filter` and `/colour`
//! commands: decode whatever image bytes a user throws at it, apply one
//! of a fixed catalogue of filters, and hand back PNG or GIF bytes ready
//! to attach to a reply.
//!
//! # Architecture: Decode → Transform → Encode
//!
//! Every invocation is one pass through three stages over in-memory
//! buffers — no I/O, no shared state, nothing outlives the call:
//!
//! ```text
//! 1. Decode      bytes     →  Source          (still image or frame sequence)
//! 2. Transform   Source    →  FilterOutput    (per-frame filter, bounded size/count)
//! 3. Encode      output    →  Encoded bytes   (PNG for stills, GIF for sequences)
//! ```
//!
//! The transform stage enforces the two resource bounds that make
//! arbitrary user input safe to process: frames are downscaled to at most
//! 512x512 pixels worth of area, and animations are subsampled to at most
//! 100 frames with per-frame durations rescaled so playback length is
//! preserved.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`codec`] | Stage 1 and 3 — byte decode to [`frame::Source`], PNG/GIF encode with loop and disposal metadata |
//! | [`filters`] | Stage 2 — the [`filters::Filter`] catalogue and its single-frame transforms |
//! | [`animate`] | Lifts single-frame transforms over animated sequences: subsampling, duration rescale, parallel fan-out |
//! | [`normalize`] | RGBA conversion and the bounded-pixel-count resize every transform starts with |
//! | [`colour`] | Hex/int/tuple colour conversions, perceived brightness, the colour report |
//! | `enhance` | Internal pixel operators (saturation, contrast, sharpness, palette quantization) the filters are built from |
//! | [`frame`] | Shared types: [`frame::Frame`], [`frame::Sequence`], [`frame::Source`], [`frame::FilterOutput`] |
//!
//! # Design Decisions
//!
//! ## Closed Filter Enum
//!
//! Filters dispatch through the [`filters::Filter`] enum rather than a
//! name-keyed table. A typo'd name is an [`filters::UnknownFilter`] parse
//! error at the boundary, and `match` exhaustiveness keeps the catalogue,
//! its names, and its transforms in sync at compile time. The `"random"`
//! meta-name is resolved by [`filters::Filter::random`] before dispatch —
//! it is not a catalogue entry.
//!
//! ## Explicit Still/Animated Sum Types
//!
//! A filter applied to a still image returns a still image; applied to an
//! animation it returns an animation. Both sides are tagged enums
//! ([`frame::Source`], [`frame::FilterOutput`]) so callers handle the two
//! shapes explicitly instead of sniffing for a list.
//!
//! ## Value-Level Errors Only
//!
//! Undecodable bytes, bad colour strings, and transform failures are
//! plain `Result` values for the caller to phrase; this crate never logs
//! them as handling, never retries, and never falls back to a different
//! filter.

pub mod animate;
pub mod codec;
pub mod colour;
mod enhance;
pub mod filters;
pub mod frame;
pub mod normalize;

pub use codec::{CodecError, Encoded, EncodedFormat, decode, encode};
pub use colour::{ColourError, ColourReport};
pub use filters::{Filter, FilterError, UnknownFilter};
pub use frame::{FilterOutput, Frame, LoopCount, Sequence, Source};
