// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod change_text_case;
pub mod prefix_suffix_adder;
pub mod reverse_text;

pub use change_text_case::*;
pub use prefix_suffix_adder::*;
pub use reverse_text::*;

/// Read size used by the streaming text handlers.
pub(crate) const CHUNK_SIZE: usize = 8 * 1024;
