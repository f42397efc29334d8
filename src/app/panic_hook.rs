use std::io::{self, Write};
use std::panic;
use std::sync::OnceLock;

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// Finish the live meter line and record the crash before the default hook prints.
pub fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let mut stdout = io::stdout();
            let _ = stdout.write_all(b"\n");
            let _ = stdout.flush();
            super::log_panic(info);
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            super::log_debug(&format!("panic at {location}"));
            previous(info);
        }));
    });
}
