//! System event names.

/// Activate a component (click, Enter, Space).
pub const EXECUTE: &str = "alloy.execute";
pub const FOCUS: &str = "alloy.focus";
pub const BLUR: &str = "alloy.blur";
pub const KEY_DOWN: &str = "alloy.keydown";

/// Fired on each node when its tree is mounted.
pub const ATTACHED: &str = "alloy.system.attached";
/// Fired on each node before its tree is deregistered.
pub const DETACHED: &str = "alloy.system.detached";

pub const CHANGE_TAB: &str = "alloy.change.tab";
pub const DISMISS_TAB: &str = "alloy.dismiss.tab";
pub const SANDBOX_CLOSE: &str = "alloy.sandbox.close";

/// Name used in `eventOrder` for the component's own handler.
pub const BASE_HANDLER: &str = "alloy.base.behaviour";
