// tape-cpu

mod affinity;
mod backoff;
mod error;
mod pad;

pub use {
    affinity::{cpu_count, max_cpu_id, set_cpu_affinity},
    backoff::wait_backoff,
    error::CpuAffinityError,
    pad::{CachePadded, CACHE_LINE_SIZE},
};
