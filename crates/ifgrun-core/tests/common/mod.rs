pub mod scripted_runner;
pub mod shared_buf;
