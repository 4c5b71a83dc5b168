//! # GA4GH Client
//!
//! Sequence repository access for GA4GH tooling.
//!
//! [`SeqRepoRestDataProxy`] reads sequences and sequence metadata from a
//! seqrepo REST service. [`Translator`] layers identifier qualification and
//! translation on top of any [`DataProxy`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ga4gh_client::{SeqRepoRestDataProxy, Translator, TranslatorOptions};
//!
//! # async fn run() -> ga4gh_client::Result<()> {
//! let proxy = SeqRepoRestDataProxy::new("http://localhost:5000/seqrepo")?;
//! let tlr = Translator::new(Arc::new(proxy), TranslatorOptions::default())?;
//! let sequence_id = tlr.translate_sequence_identifier("19").await?;
//! assert!(sequence_id.starts_with("ga4gh:SQ."));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Error types for client operations
pub mod error;

/// Data proxy and translator configuration
pub mod config;

/// Sequence data proxies
pub mod dataproxy;

/// Translator over a data proxy
pub mod translator;

pub use config::{DEFAULT_ASSEMBLY_NAME, DEFAULT_SEQREPO_URL, DataProxyConfig, TranslatorOptions};
pub use dataproxy::{DataProxy, DataProxyExt, SeqRepoRestDataProxy, SequenceMetadata};
pub use error::{ClientError, Result};
pub use translator::{GA4GH_NAMESPACE, Translator};
