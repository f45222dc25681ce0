//! Core-pinned thread spawning for the ESP32-S3.
//!
//! ESP-IDF backs `std::thread` with pthreads over FreeRTOS tasks.
//! `esp_pthread_set_cfg()` sets thread-local configuration for the *next*
//! `pthread_create()` from the calling thread, so the config and the spawn
//! must not be interleaved with other thread creation on that thread.
//! Off target, core and priority are ignored.

use std::io;
use std::thread::{Builder, JoinHandle};

/// CPU core identifiers for the ESP32-S3 Xtensa LX7 dual-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU), shared with the ESP-IDF system tasks.
    Pro = 0,
    /// Core 1 (APP_CPU), where the rotation loop and its helpers run.
    App = 1,
}

/// Placement of one worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskConfig {
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
    /// NUL-terminated, e.g. `"buttons\0"`.
    pub name: &'static str,
}

impl TaskConfig {
    /// Name without the trailing NUL.
    pub fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

/// Spawn a thread pinned to `task.core` with explicit priority and stack.
#[cfg(target_os = "espidf")]
pub fn spawn_on_core<F, T>(task: TaskConfig, f: F) -> io::Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    if !task.name.ends_with('\0') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "task name must be NUL-terminated",
        ));
    }
    // SAFETY: `cfg` is fully initialised by ESP-IDF and `name` is a
    // 'static NUL-terminated string, so the pointer outlives the task.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = task.core as i32;
        cfg.prio = i32::from(task.priority);
        cfg.stack_size = (task.stack_kb * 1024) as _;
        cfg.thread_name = task.name.as_ptr().cast();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        return Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")));
    }

    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        task.display_name(),
        task.core,
        task.priority,
        task.stack_kb
    );
    Builder::new().name(task.display_name().into()).spawn(f)
}

/// Smallest stack a host thread gets; the console logger needs headroom
/// the target's log backend does not.
#[cfg(not(target_os = "espidf"))]
const HOST_MIN_STACK_KB: usize = 64;

/// Host fallback: only the stack size and name are honoured.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_on_core<F, T>(task: TaskConfig, f: F) -> io::Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    log::debug!(
        "Spawning '{}' (sim, no core pinning, stack={}KB)",
        task.display_name(),
        task.stack_kb
    );
    Builder::new()
        .name(task.display_name().into())
        .stack_size(task.stack_kb.max(HOST_MIN_STACK_KB) * 1024)
        .spawn(f)
}
