//! Display timers
//!
//! Both timers run on their own worker thread and feed events back into the
//! serializer rather than touching the display themselves.

pub mod carousel;
pub mod timeout;
pub mod timer;

pub use carousel::{Carousel, CarouselTick, CarouselView, VIEWS};
pub use timeout::{InactivityTimeout, TimeoutReset};
pub use timer::{Timer, TimerState};
