//! Path handling for configuration options.
//!
//! # Key Concepts
//!
//! ## Base directories
//!
//! The root, config, data, managed config and sample directories are worked
//! out first and made absolute ([`BaseDirectories`]). Every other path
//! option ultimately resolves against one of them.
//!
//! ## Resolution
//!
//! A path option names the option it is relative to. [`OptionPathResolver`]
//! joins each option's value onto its parent's resolved path, resolving
//! every option at most once.
//!
//! ## Fallbacks
//!
//! Two fallbacks bracket resolution and never apply to the same option:
//!
//! - For explicitly set options, a missing relative path is retried against
//!   the root ([`RootFallback`]).
//! - For unset options with a bundled sample file, the sample is appended
//!   to the candidates and the first existing candidate wins
//!   ([`SampleSelector`]).
//!
//! Existence checks go through [`PathProbe`].

mod dirs;
mod fallback;
pub mod normalize;
mod probe;
mod resolver;
mod samples;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use dirs::BaseDirectories;
pub use fallback::RootFallback;
pub use probe::{FsProbe, PathProbe};
pub use resolver::OptionPathResolver;
pub use samples::SampleSelector;

#[cfg(test)]
pub(crate) use probe::MockPathProbe;
