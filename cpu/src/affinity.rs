// thread-to-core pinning
//
// latency measurements are meaningless if the producer and consumer migrate
// between cores mid-run; benchmark harnesses pin each thread before the
// measured loop

use {
    crate::error::CpuAffinityError,
    std::{fs, io},
};

// glibc's fixed cpu_set_t width
#[cfg(target_os = "linux")]
const CPU_SETSIZE: usize = 1024;

// pin the calling thread to the given set of cpus
#[cfg(target_os = "linux")]
pub fn set_cpu_affinity(cpus: impl IntoIterator<Item = usize>) -> Result<(), CpuAffinityError> {
    // safety: cpu_set_t is plain data, zero is the empty set
    let mut cpu_set: libc::cpu_set_t = unsafe { std::mem::zeroed() };
    let max_cpu = max_cpu_id()?;
    let mut has_cpus = false;

    for cpu in cpus {
        if cpu > max_cpu {
            return Err(CpuAffinityError::InvalidCpu { cpu, max: max_cpu });
        }
        if cpu >= CPU_SETSIZE {
            return Err(CpuAffinityError::InvalidCpu {
                cpu,
                max: CPU_SETSIZE - 1,
            });
        }

        // safety: cpu validated against both bounds above
        unsafe {
            libc::CPU_SET(cpu, &mut cpu_set);
        }
        has_cpus = true;
    }

    if !has_cpus {
        return Err(CpuAffinityError::EmptyCpuList);
    }

    // safety: pid 0 targets the calling thread, set is initialized
    let result = unsafe {
        libc::sched_setaffinity(
            0,
            std::mem::size_of::<libc::cpu_set_t>(),
            &cpu_set,
        )
    };

    if result != 0 {
        return Err(CpuAffinityError::Io(io::Error::last_os_error()));
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn set_cpu_affinity(_cpus: impl IntoIterator<Item = usize>) -> Result<(), CpuAffinityError> {
    Err(CpuAffinityError::NotSupported)
}

// highest online cpu id
#[cfg(target_os = "linux")]
pub fn max_cpu_id() -> Result<usize, CpuAffinityError> {
    // sysfs publishes the online range as "0-N" (or a bare "0")
    if let Ok(content) = fs::read_to_string("/sys/devices/system/cpu/online") {
        let content = content.trim();

        if let Some(range) = content.split('-').nth(1) {
            if let Ok(max) = range.parse::<usize>() {
                return Ok(max);
            }
        } else if let Ok(max) = content.parse::<usize>() {
            return Ok(max);
        }
    }

    // safety: sysconf has no preconditions
    let count = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };

    if count <= 0 {
        return Err(CpuAffinityError::Io(io::Error::last_os_error()));
    }

    Ok((count as usize).saturating_sub(1))
}

#[cfg(not(target_os = "linux"))]
pub fn max_cpu_id() -> Result<usize, CpuAffinityError> {
    Err(CpuAffinityError::NotSupported)
}

// number of online logical cpus (hyperthreads included)
pub fn cpu_count() -> Result<usize, CpuAffinityError> {
    Ok(max_cpu_id()?.saturating_add(1))
}
