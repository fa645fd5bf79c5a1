//! Shared types for the logloom workspace: the directive pair emitted by
//! settings translators, the load error taxonomy, and the seams to the
//! diagnostic channel and the downstream configuration engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single configuration instruction for the downstream logging engine.
///
/// Keys are colon/dot-delimited paths such as `write-to:File.path`. Emission
/// order is significant: repeated keys (e.g. `using:*`) are append-like, and
/// the engine may depend on the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub key: String,
    /// May be empty: an empty value still marks the key as present.
    pub value: String,
}

impl Directive {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Fatal outcomes of loading a settings document.
///
/// A missing file is deliberately not represented here: translators treat it
/// as "no configuration contributed" and return an empty sequence instead.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file exists but could not be read.
    #[error("cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document is not well-formed XML.
    #[error("{0}")]
    Xml(String),
}

/// Write-only, line-oriented self-diagnostics channel.
///
/// A library-internal trace channel, not user-facing output. Translators
/// report "file does not exist, ignoring" notices here, and record load
/// failures before returning them to the caller.
pub trait DiagnosticSink {
    /// Informational notice (e.g. an absent, ignorable settings file).
    fn info(&self, message: &str);
    /// Failure detail, recorded before the error propagates.
    fn error(&self, message: &str);
}

/// Default sink: forwards each record to [`tracing`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn info(&self, message: &str) {
        tracing::info!(target: "logloom", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "logloom", "{message}");
    }
}

/// Sink that discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagnostics;

impl DiagnosticSink for NullDiagnostics {
    fn info(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}

/// Downstream "apply key-value settings" engine.
///
/// Receives the full ordered sequence in one call. Translators never hand
/// over a partial sequence: a fatal load error surfaces before this point.
pub trait DirectiveConsumer {
    fn apply(&mut self, directives: &[Directive]);
}

impl<F: FnMut(&[Directive])> DirectiveConsumer for F {
    fn apply(&mut self, directives: &[Directive]) {
        self(directives);
    }
}
