use lazy_static::lazy_static;
use regex::Regex;

use crate::config::PasswordPolicy;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_alphanumeric(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

pub(crate) fn password_in_policy(password: &str, policy: &PasswordPolicy) -> bool {
    let len = password.chars().count();
    len >= policy.min_len && len <= policy.max_len
}
