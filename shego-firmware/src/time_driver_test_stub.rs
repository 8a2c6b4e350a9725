//! Host time driver for tests. Each test thread owns its clock; a clock that was never set
//! follows the system time.

extern crate std;

use core::{cell::RefCell, task::Waker};
use embassy_time_driver::Driver;
use std::time::SystemTime;

struct TestTimeDriver;

#[derive(Default)]
struct Clock {
    /// Current time in µs.
    now: Option<u64>,
}

impl Driver for TestTimeDriver {
    fn now(&self) -> u64 {
        CLOCK.with_borrow(|clock| {
            clock.now.unwrap_or_else(|| {
                SystemTime::now()
                    .duration_since(SystemTime::UNIX_EPOCH)
                    .unwrap()
                    .as_micros() as u64
            })
        })
    }

    fn schedule_wake(&self, at: u64, waker: &Waker) {
        CLOCK.with_borrow_mut(|clock| {
            if let Some(now) = clock.now.as_mut() {
                // waiting on a timer jumps straight to its deadline
                *now = (*now).max(at);
            }
        });

        waker.wake_by_ref();
    }
}

std::thread_local! {
    static CLOCK: RefCell<Clock> = RefCell::new(Clock::default());
}

embassy_time_driver::time_driver_impl!(static TIME_DRIVER: TestTimeDriver = TestTimeDriver);

pub fn set_time(us: u64) {
    CLOCK.with_borrow_mut(|clock| clock.now = Some(us));
}

pub fn set_time_ms(ms: u64) {
    set_time(ms * 1000);
}

#[cfg(test)]
#[path = "time_driver_test_stub_test.rs"]
mod test;
