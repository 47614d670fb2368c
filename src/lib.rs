//! Entropy coding core of a VP8 encoder.
//!
//! This crate turns macroblock-level decisions (quantised coefficients and motion vectors)
//! into the VP8 boolean-coded bitstream and provides the bit cost estimates used by
//! rate-distortion decisions of the encoder proper.
//!
//! The building blocks are:
//! * [`BoolEncoder`] - binary range coder writing into a bounded byte buffer;
//! * [`TreeModel`] and [`VPTreeWriter`] - tree-coded symbols, their probabilities and costs;
//! * [`TokenModel`] - DCT token generation, neighbour contexts and coefficient statistics;
//! * [`MVEntropyCoder`] - motion vector component coding and probability adaptation.
//!
//! [`VP8EntropyCoder`] ties them together on frame level.
//!
//! [`BoolEncoder`]: ./vpenc/coder/struct.BoolEncoder.html
//! [`TreeModel`]: ./vpenc/tree/struct.TreeModel.html
//! [`VPTreeWriter`]: ./vpenc/tree/trait.VPTreeWriter.html
//! [`TokenModel`]: ./vp8enc/tokens/struct.TokenModel.html
//! [`MVEntropyCoder`]: ./vp8enc/mv/struct.MVEntropyCoder.html
//! [`VP8EntropyCoder`]: ./vp8enc/struct.VP8EntropyCoder.html
pub mod error;
pub mod options;

#[allow(clippy::unreadable_literal)]
pub mod vpenc;

#[allow(clippy::upper_case_acronyms)]
#[allow(clippy::needless_range_loop)]
pub mod vp8enc;

pub use crate::error::{EncoderError, EncoderResult};
pub use crate::vpenc::coder::BoolEncoder;
pub use crate::vpenc::tree::{TreeModel, VPTreeDef, VPTreeWriter};
pub use crate::vp8enc::VP8EntropyCoder;
pub use crate::vp8enc::tokens::TokenModel;
pub use crate::vp8enc::mv::MVEntropyCoder;
