//! GPIO / peripheral pin assignments for the ScanLink main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! Camera (DVP) wiring is owned by the vendor recognition component and its
//! sdkconfig; it is intentionally not duplicated here.

// ---------------------------------------------------------------------------
// Blink LED bank (three discrete channels)
// ---------------------------------------------------------------------------

/// Digital output: blink channel A (red LED).
pub const LED_A_GPIO: i32 = 11;
/// Digital output: blink channel B (green LED).
pub const LED_B_GPIO: i32 = 12;
/// Digital output: blink channel C (blue LED).
pub const LED_C_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Status indicator
// ---------------------------------------------------------------------------

/// Digital output: registration status LED, toggled by the 250 ms ticker.
pub const STATUS_LED_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// User input
// ---------------------------------------------------------------------------

/// Digital input: unregister button (active low, falling-edge interrupt).
/// Uses the boot-strap button on the devkit — safe to share after boot.
pub const BUTTON_GPIO: i32 = 0;
