use lgl_platform::ProcessMemory;

/// Window title with frame timing and process memory appended.
pub fn format_title(base: &str, frame_ms: f64, fps: f64, memory: Option<ProcessMemory>) -> String {
    let memory = memory.unwrap_or_default();
    format!(
        "{} - dev - {:5.2} ms/f - {:5.2} fps - working set mem {}kb - page file touched mem {}kb",
        base, frame_ms, fps, memory.working_set_kb, memory.pagefile_kb
    )
}
