//! Integration tests driving the releasekit binary against real git repositories

mod helpers;
mod test_check;
mod test_init;
mod test_release;
