use std::error;
use std::fmt;
use std::io;

/// Malformed run configuration (including an unknown transition system name, which
/// `serde` rejects during deserialization) or a referenced file that doesn't exist.
/// Always fatal at startup.
#[derive(Debug)]
pub enum ConfigError {
    Io(String, io::Error),
    Deserialize(serde_yaml::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(path, err) => write!(f, "could not read \"{}\": {}", path, err),
            ConfigError::Deserialize(err) => write!(f, "failed to parse run configuration: {}", err),
        }
    }
}

impl error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ConfigError::Io(_, err) => Some(err),
            ConfigError::Deserialize(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Deserialize(err)
    }
}

/// A syntax error in a feature-template file, reported with a 1-based line number so it
/// can be pointed at directly in a diagnostic. Fatal at startup.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FeatureTemplateSyntaxError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for FeatureTemplateSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl error::Error for FeatureTemplateSyntaxError {}

/// Failure loading the external linear model. Fatal at startup.
#[derive(Debug)]
pub struct ModelLoadError {
    pub message: String,
}

impl fmt::Display for ModelLoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "failed to load model: {}", self.message)
    }
}

impl error::Error for ModelLoadError {}

/// A precondition violation inside `Transition::apply`: the caller applied a transition
/// that was not in `possible(config)`. This indicates a bug in the guide or transition
/// system, not a property of the input sentence, so it is treated as a defensive abort
/// rather than a recoverable per-sentence error.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PreconditionViolation {
    pub message: String,
}

impl fmt::Display for PreconditionViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "precondition violation: {}", self.message)
    }
}

impl error::Error for PreconditionViolation {}

/// The model's ranked transition list contained nothing legal in the current
/// configuration. Per-sentence: the sentence is abandoned, subsequent sentences are
/// unaffected.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NoLegalTransition;

impl fmt::Display for NoLegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "no legal transition found among the model's ranked candidates")
    }
}

impl error::Error for NoLegalTransition {}

/// Everything that can go wrong while parsing a single sentence. Distinct from the
/// startup-fatal errors above: a `ParseError` aborts only the sentence that produced it.
#[derive(Debug)]
pub enum ParseError {
    NoLegalTransition(NoLegalTransition),
    PreconditionViolation(PreconditionViolation),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::NoLegalTransition(err) => write!(f, "{}", err),
            ParseError::PreconditionViolation(err) => write!(f, "{}", err),
        }
    }
}

impl error::Error for ParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ParseError::NoLegalTransition(err) => Some(err),
            ParseError::PreconditionViolation(err) => Some(err),
        }
    }
}

impl From<NoLegalTransition> for ParseError {
    fn from(err: NoLegalTransition) -> Self {
        ParseError::NoLegalTransition(err)
    }
}

impl From<PreconditionViolation> for ParseError {
    fn from(err: PreconditionViolation) -> Self {
        ParseError::PreconditionViolation(err)
    }
}

/// Failure reading or writing a CoNLL-X sentence stream. Fatal: aborts the whole stream,
/// since a malformed block usually means every subsequent block is misaligned too.
#[derive(Debug)]
pub enum ConllxError {
    Io(io::Error),
    MalformedLine { line: usize, message: String },
}

impl fmt::Display for ConllxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConllxError::Io(err) => write!(f, "io error: {}", err),
            ConllxError::MalformedLine { line, message } => write!(f, "line {}: {}", line, message),
        }
    }
}

impl error::Error for ConllxError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ConllxError::Io(err) => Some(err),
            ConllxError::MalformedLine { .. } => None,
        }
    }
}

impl From<io::Error> for ConllxError {
    fn from(err: io::Error) -> Self {
        ConllxError::Io(err)
    }
}
