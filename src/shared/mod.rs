pub mod constants;
#[cfg(test)]
pub mod test_helpers;
pub mod time;
pub mod types;
pub mod validation;
