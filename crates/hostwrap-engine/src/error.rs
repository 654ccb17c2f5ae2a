//! Engine error types

use hostwrap_sdk::HostError;

/// Engine operation result
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors surfaced to the template evaluator.
///
/// Call-time variants are recoverable and never cached; the next call with
/// different arguments may succeed. `PolicyMisconfiguration` and `Config` are
/// raised while building a wrapper and are fatal to that construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    /// No overload of the member accepts this many arguments
    #[error("No overload of {member} accepts {argc} argument(s)")]
    WrongArity {
        /// Member name
        member: String,
        /// Number of arguments supplied
        argc: usize,
    },

    /// Arity matched but some argument cannot be converted for any overload
    #[error("No compatible overload of {member} for ({args}){}", failing_suffix(.failing_argument))]
    NoCompatibleOverload {
        /// Member name
        member: String,
        /// Dynamic types of the supplied arguments
        args: String,
        /// Zero-based index of the first unconvertible argument, when all
        /// overloads agree on it
        failing_argument: Option<usize>,
    },

    /// More than one overload is equally specific
    #[error("Ambiguous call to {member}; candidates: {}", .candidates.join(", "))]
    AmbiguousOverload {
        /// Member name
        member: String,
        /// Signatures of the tied candidates
        candidates: Vec<String>,
    },

    /// The host member itself failed
    #[error("Invocation of {member} failed: {source}")]
    InvocationFailure {
        /// Signature of the invoked member
        member: String,
        /// Host-side failure
        #[source]
        source: HostError,
    },

    /// Access policy cannot be built
    #[error("Policy misconfiguration: {0}")]
    PolicyMisconfiguration(String),

    /// No exposed member with this name
    #[error("No exposed member {member} on {type_name}")]
    NoSuchMember {
        /// Type name
        type_name: String,
        /// Member name
        member: String,
    },

    /// Type has no exposed constructor
    #[error("{0} has no exposed constructor")]
    NotInstantiable(String),

    /// A dynamic value cannot be converted to the requested host type
    #[error("Cannot convert {got} to {expected}")]
    UnwrapFailed {
        /// Requested host type
        expected: String,
        /// Dynamic type of the value
        got: String,
    },

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

fn failing_suffix(failing_argument: &Option<usize>) -> String {
    match failing_argument {
        Some(i) => format!("; argument {} cannot be converted", i + 1),
        None => String::new(),
    }
}

impl From<toml::de::Error> for BridgeError {
    fn from(err: toml::de::Error) -> Self {
        BridgeError::Config(err.to_string())
    }
}
