mod local;
mod timeout;
