//! Process memory counters shown in the window title.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessMemory {
    pub working_set_kb: u64,
    pub pagefile_kb: u64,
}

impl ProcessMemory {
    pub fn from_bytes(working_set: u64, pagefile: u64) -> Self {
        Self {
            working_set_kb: working_set / 1024,
            pagefile_kb: pagefile / 1024,
        }
    }
}

#[cfg(windows)]
pub fn process_memory() -> Option<ProcessMemory> {
    use std::mem;
    use windows_sys::Win32::System::ProcessStatus::{
        K32GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS,
    };
    use windows_sys::Win32::System::Threading::GetCurrentProcess;

    let mut counters: PROCESS_MEMORY_COUNTERS = unsafe { mem::zeroed() };
    counters.cb = mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32;
    let ok = unsafe { K32GetProcessMemoryInfo(GetCurrentProcess(), &mut counters, counters.cb) };
    if ok == 0 {
        log::trace!("GetProcessMemoryInfo failed");
        return None;
    }
    Some(ProcessMemory::from_bytes(
        counters.WorkingSetSize as u64,
        counters.PagefileUsage as u64,
    ))
}

#[cfg(not(windows))]
pub fn process_memory() -> Option<ProcessMemory> {
    None
}
