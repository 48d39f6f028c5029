//! Mail-exchange resolution.
//!
//! [`resolve_target`] turns a domain into the single IP address the SMTP
//! probe should connect to: MX records are ranked by preference and each
//! exchange is resolved AAAA-first, falling back to A, until one answers.
//! [`check_mx`] exposes the ranked record list on its own.

mod error;
mod resolver;
mod types;

pub use error::{LookupError, ResolutionError};
pub use resolver::{
    DnsLookup, check_mx, ranked_candidates, resolve_target, resolve_target_quiet,
    system_resolver,
};
pub use types::{AddressFamily, MxCandidate, MxStatus, ResolvedTarget};

pub(crate) use resolver::normalize_domain;
