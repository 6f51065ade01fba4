// errors for thread-to-core pinning

use std::{error::Error, fmt, io};

#[derive(Debug)]
#[non_exhaustive]
pub enum CpuAffinityError {
    // syscall or /sys read failed
    Io(io::Error),

    // pinning not available on this platform
    NotSupported,

    // requested cpu id beyond what the system or CPU_SET supports
    InvalidCpu { cpu: usize, max: usize },

    // no cpu ids supplied
    EmptyCpuList,
}

impl fmt::Display for CpuAffinityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuAffinityError::Io(err) => write!(f, "I/O error: {}", err),
            CpuAffinityError::NotSupported => {
                write!(f, "CPU pinning is not supported on this platform")
            }
            CpuAffinityError::InvalidCpu { cpu, max } => {
                write!(f, "CPU {} is invalid (max CPU is {})", cpu, max)
            }
            CpuAffinityError::EmptyCpuList => write!(f, "CPU list cannot be empty"),
        }
    }
}

impl Error for CpuAffinityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CpuAffinityError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CpuAffinityError {
    fn from(err: io::Error) -> Self {
        CpuAffinityError::Io(err)
    }
}
