//! Native message codes delivered to low-level keyboard and mouse hooks.
//!
//! Values match the Win32 `WM_*` constants.  The Windows adapter checks them
//! against the `windows` crate at compile time.

/// Hook code meaning the record describes a real input action.
pub const HC_ACTION: i32 = 0;

// ── Keyboard ──────────────────────────────────────────────────────────────────

pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_SYSKEYDOWN: u32 = 0x0104;
pub const WM_SYSKEYUP: u32 = 0x0105;

// ── Mouse ─────────────────────────────────────────────────────────────────────

pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;
pub const WM_MOUSEWHEEL: u32 = 0x020A;
pub const WM_XBUTTONDOWN: u32 = 0x020B;
pub const WM_XBUTTONUP: u32 = 0x020C;
pub const WM_MOUSEHWHEEL: u32 = 0x020E;
pub const WM_NCXBUTTONDOWN: u32 = 0x00AB;
pub const WM_NCXBUTTONUP: u32 = 0x00AC;

/// High word of `mouse_data` for the first extra ("back") button.
pub const XBUTTON1: u16 = 0x0001;
/// High word of `mouse_data` for the second extra ("forward") button.
pub const XBUTTON2: u16 = 0x0002;
