//! Process-wide interrupt handler used to break out of a blocked accept.

use std::io;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::trace::debug;

/// Signal that interrupts a blocked [`TcpServer::accept`] once the handler
/// is installed.
///
/// [`TcpServer::accept`]: crate::TcpServer::accept
pub const INTERRUPT_SIGNAL: libc::c_int = libc::SIGUSR1;

static INSTALLED: Mutex<bool> = Mutex::new(false);

extern "C" fn on_interrupt(_signal: libc::c_int) {}

/// Installs a no-op handler for [`INTERRUPT_SIGNAL`], once per process.
///
/// `SA_RESTART` is left unset so blocking calls in the receiving thread fail
/// with `EINTR` instead of resuming.
pub(crate) fn install_interrupt_handler() -> Result<()> {
    let mut installed = INSTALLED.lock().unwrap_or_else(|e| e.into_inner());
    if *installed {
        return Ok(());
    }

    // SAFETY: `action` is fully initialised before use and the handler is an
    // empty `extern "C"` function, which is async-signal-safe.
    let rc = unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = 0;
        libc::sigemptyset(&mut action.sa_mask);
        libc::sigaction(INTERRUPT_SIGNAL, &action, std::ptr::null_mut())
    };
    if rc != 0 {
        return Err(Error::Signal(io::Error::last_os_error()));
    }

    debug!(signal = INTERRUPT_SIGNAL, "interrupt handler installed");
    *installed = true;
    Ok(())
}
