//! Signup policy shared by both gatekeeper trigger wirings.

/// Result of checking an email against a [`SignupPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  Allow,
  Deny,
}

impl Verdict {
  pub fn is_allowed(self) -> bool { matches!(self, Self::Allow) }
}

/// A rule deciding whether an account with the given email may exist.
///
/// Accounts without an email are checked as `""`.
pub trait SignupPolicy: Send + Sync {
  fn check(&self, email: &str) -> Verdict;
}

/// Allows exactly the emails ending with a fixed suffix, e.g. `@vit.ac.in`.
///
/// The match is case-sensitive and anchored at the end of the string.
#[derive(Debug, Clone)]
pub struct DomainSuffixPolicy {
  suffix: String,
}

impl DomainSuffixPolicy {
  pub fn new(suffix: impl Into<String>) -> Self { Self { suffix: suffix.into() } }

  pub fn suffix(&self) -> &str { &self.suffix }
}

impl SignupPolicy for DomainSuffixPolicy {
  fn check(&self, email: &str) -> Verdict {
    if email.ends_with(&self.suffix) {
      Verdict::Allow
    } else {
      Verdict::Deny
    }
  }
}
