mod concurrent;
mod sequential;
mod templates;
