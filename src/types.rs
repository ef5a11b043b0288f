use std::fmt;

/// One of the two output channels of the maintenance script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputSource {
    Stdout,
    Stderr,
}

impl OutputSource {
    pub const ALL: [OutputSource; 2] = [OutputSource::Stdout, OutputSource::Stderr];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputSource::Stdout => "stdout",
            OutputSource::Stderr => "stderr",
        }
    }
}

impl fmt::Display for OutputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the maintenance script cannot be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptProblem {
    NotFound,
    NotExecutable,
}

impl fmt::Display for ScriptProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptProblem::NotFound => f.write_str("not found"),
            ScriptProblem::NotExecutable => f.write_str("not executable"),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictReason {
    NormalExit,
    Signaled,
    SpawnFailed,
}

impl fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictReason::NormalExit => f.write_str("normal-exit"),
            VerdictReason::Signaled => f.write_str("signaled"),
            VerdictReason::SpawnFailed => f.write_str("spawn-failed"),
        }
    }
}
