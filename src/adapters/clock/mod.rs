//! Clock adapters.
//!
//! - `SystemClock` - Wall clock at a fixed UTC offset
//! - `ManualClock` - Test clock moved by hand

mod manual_clock;
mod system_clock;

pub use manual_clock::ManualClock;
pub use system_clock::SystemClock;
