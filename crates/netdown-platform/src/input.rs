//! Input-activity probes.
//!
//! A probe answers one question: did any monitored input device register
//! activity since the previous call? Probe failures degrade to `false` —
//! a broken sensor must never look like user activity.

/// Trait seam for input activity sampling.
pub trait InputProbe: Send {
    fn poll_activity(&mut self) -> bool;
}

/// Probe that never reports activity.
///
/// Used where no input facility is available; the monitor then runs on
/// connectivity alone and idle time counts from monitor start.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInputProbe;

impl InputProbe for NullInputProbe {
    fn poll_activity(&mut self) -> bool {
        false
    }
}

#[cfg(windows)]
mod key_state {
    //! Async key-state polling over the full virtual-key range plus the
    //! three mouse buttons. One positive sample per poll is enough; the
    //! caller coalesces anyway.

    use super::InputProbe;

    #[link(name = "user32")]
    unsafe extern "system" {
        safe fn GetAsyncKeyState(v_key: i32) -> i16;
    }

    const VK_LBUTTON: i32 = 0x01;
    const VK_RBUTTON: i32 = 0x02;
    const VK_MBUTTON: i32 = 0x04;
    /// High bit of the GetAsyncKeyState result: key is currently down.
    const KEY_PRESSED: u16 = 0x8000;

    fn pressed(v_key: i32) -> bool {
        (GetAsyncKeyState(v_key) as u16) & KEY_PRESSED != 0
    }

    /// Polls keyboard and mouse button states via `GetAsyncKeyState`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct KeyStateProbe;

    impl InputProbe for KeyStateProbe {
        fn poll_activity(&mut self) -> bool {
            if pressed(VK_LBUTTON) || pressed(VK_RBUTTON) || pressed(VK_MBUTTON) {
                return true;
            }
            // 0x08 (backspace) through 0xFF covers the keyboard range.
            (0x08..=0xFF).any(pressed)
        }
    }
}

#[cfg(windows)]
pub use key_state::KeyStateProbe;

/// Platform-default input probe.
pub fn default_input_probe() -> Box<dyn InputProbe> {
    #[cfg(windows)]
    let probe: Box<dyn InputProbe> = Box::new(KeyStateProbe);
    #[cfg(not(windows))]
    let probe: Box<dyn InputProbe> = Box::new(NullInputProbe);
    probe
}
