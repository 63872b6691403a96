//! Error types for the chunglu core library.
//!
//! Configuration, sink, and run-level failures each carry a stable
//! machine-readable code so callers can branch on them without matching on
//! display strings.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::edge::Edge;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// A degree-class configuration was rejected before generation started.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Class sizes and expected degrees had different lengths.
    #[error("class sizes and degrees differ in length: sizes={sizes}, degrees={degrees}")]
    LengthMismatch {
        /// Number of class sizes supplied.
        sizes: usize,
        /// Number of expected degrees supplied.
        degrees: usize,
    },
    /// No degree classes were supplied.
    #[error("at least one degree class is required")]
    EmptyModel,
    /// A class contained no vertices.
    #[error("degree class {class} must contain at least one vertex")]
    ZeroClassSize {
        /// Index of the offending class.
        class: usize,
    },
    /// A class carried a non-finite or non-positive expected degree.
    #[error("degree class {class} has invalid expected degree {degree}")]
    InvalidDegree {
        /// Index of the offending class.
        class: usize,
        /// The rejected degree value.
        degree: f64,
    },
    /// Vertex identifiers or candidate pair counts would not fit in 64 bits.
    #[error("degree class {class} overflows the 64-bit {quantity}")]
    CapacityOverflow {
        /// Index of the class at which the overflow was detected.
        class: usize,
        /// Which quantity overflowed.
        quantity: &'static str,
    },
}

define_error_codes! {
    /// Stable codes describing [`ConfigError`] variants.
    enum ConfigErrorCode for ConfigError {
        /// Class sizes and expected degrees had different lengths.
        LengthMismatch => LengthMismatch { .. } => "CONFIG_LENGTH_MISMATCH",
        /// No degree classes were supplied.
        EmptyModel => EmptyModel => "CONFIG_EMPTY_MODEL",
        /// A class contained no vertices.
        ZeroClassSize => ZeroClassSize { .. } => "CONFIG_ZERO_CLASS_SIZE",
        /// A class carried an invalid expected degree.
        InvalidDegree => InvalidDegree { .. } => "CONFIG_INVALID_DEGREE",
        /// Vertex identifiers or candidate counts would overflow.
        CapacityOverflow => CapacityOverflow { .. } => "CONFIG_CAPACITY_OVERFLOW",
    }
}

/// An error produced by an [`crate::EdgeSink`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SinkError {
    /// The backing store failed to open or to write.
    #[error("storage failure: {message}")]
    Storage {
        /// Description of the storage failure.
        message: Arc<str>,
        /// Whether retrying the same operation may succeed.
        transient: bool,
    },
    /// An edge could not be encoded for storage.
    #[error("failed to encode edge {edge}: {message}")]
    Serialization {
        /// The edge that could not be encoded.
        edge: Edge,
        /// Description of the encoding failure.
        message: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`SinkError`] variants.
    enum SinkErrorCode for SinkError {
        /// The backing store failed to open or to write.
        Storage => Storage { .. } => "SINK_STORAGE",
        /// An edge could not be encoded for storage.
        Serialization => Serialization { .. } => "SINK_SERIALIZATION",
    }
}

impl SinkError {
    /// Builds a storage error that should not be retried.
    pub fn permanent(message: impl Into<Arc<str>>) -> Self {
        Self::Storage {
            message: message.into(),
            transient: false,
        }
    }

    /// Builds a storage error that may clear up on retry.
    pub fn transient(message: impl Into<Arc<str>>) -> Self {
        Self::Storage {
            message: message.into(),
            transient: true,
        }
    }

    /// Returns whether the failed operation may be retried.
    ///
    /// # Examples
    /// ```
    /// use chunglu_core::SinkError;
    ///
    /// assert!(SinkError::transient("database is locked").is_transient());
    /// assert!(!SinkError::permanent("disk full").is_transient());
    /// ```
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Storage {
                transient: true,
                ..
            }
        )
    }
}

/// Error type produced when configuring or running a generation.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeneratorError {
    /// The degree-class configuration was rejected.
    #[error("invalid configuration: {error}")]
    InvalidConfig {
        #[source]
        /// Underlying validation failure.
        error: ConfigError,
    },
    /// The sink failed and the run was aborted.
    #[error("sink `{sink}` failed after persisting {persisted} edges: {error}")]
    Sink {
        /// Name of the sink that failed.
        sink: Arc<str>,
        /// Number of edges durably persisted before the failure.
        persisted: u64,
        #[source]
        /// Underlying sink failure.
        error: SinkError,
    },
    /// The generation task terminated abnormally.
    #[error("edge generation failed after {pairs_processed} class pairs: {reason}")]
    GenerationFailed {
        /// Class pairs fully processed before the failure.
        pairs_processed: u64,
        /// Description of the failure.
        reason: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`GeneratorError`] variants.
    enum GeneratorErrorCode for GeneratorError {
        /// The degree-class configuration was rejected.
        InvalidConfig => InvalidConfig { .. } => "CHUNGLU_INVALID_CONFIG",
        /// The sink failed and the run was aborted.
        SinkFailure => Sink { .. } => "CHUNGLU_SINK_FAILURE",
        /// The generation task terminated abnormally.
        GenerationFailed => GenerationFailed { .. } => "CHUNGLU_GENERATION_FAILED",
    }
}

impl GeneratorError {
    /// Retrieve the inner [`ConfigErrorCode`] when the configuration was rejected.
    pub const fn config_code(&self) -> Option<ConfigErrorCode> {
        match self {
            Self::InvalidConfig { error } => Some(error.code()),
            _ => None,
        }
    }

    /// Retrieve the inner [`SinkErrorCode`] when the sink failed.
    pub const fn sink_code(&self) -> Option<SinkErrorCode> {
        match self {
            Self::Sink { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

impl From<ConfigError> for GeneratorError {
    fn from(error: ConfigError) -> Self {
        Self::InvalidConfig { error }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, GeneratorError>;
