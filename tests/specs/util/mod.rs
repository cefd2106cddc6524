mod temp;
mod wait_retry;
