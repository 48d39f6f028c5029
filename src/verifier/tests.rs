use std::cell::{Cell, RefCell};
use std::io;
use std::net::Ipv6Addr;

use super::*;
use crate::mx::tests::StubDns;
use crate::mx::{AddressFamily, LookupError, ResolvedTarget};
use crate::smtp::{ProbeError, SmtpReply};

/// Answers every probe with a fixed reply (or a connection failure) and
/// remembers which targets were contacted.
struct StubProbe {
    reply: Option<(u16, &'static str)>,
    calls: Cell<usize>,
    targets: RefCell<Vec<ResolvedTarget>>,
}

impl StubProbe {
    fn replying(code: u16, message: &'static str) -> Self {
        Self {
            reply: Some((code, message)),
            calls: Cell::new(0),
            targets: RefCell::new(Vec::new()),
        }
    }

    fn unreachable() -> Self {
        Self {
            reply: None,
            calls: Cell::new(0),
            targets: RefCell::new(Vec::new()),
        }
    }
}

impl SmtpProbe for StubProbe {
    fn probe(
        &self,
        target: &ResolvedTarget,
        _recipient: &str,
        _config: &VerifierConfig,
    ) -> Result<SmtpReply, ProbeError> {
        self.calls.set(self.calls.get() + 1);
        self.targets.borrow_mut().push(target.clone());
        match self.reply {
            Some((code, message)) => Ok(SmtpReply::new(code, message)),
            None => Err(ProbeError::io(io::Error::new(
                io::ErrorKind::TimedOut,
                "timed out",
            ))),
        }
    }
}

fn stub_dns() -> StubDns {
    StubDns::new()
        .with_mx("example.com", &[(10, "mx.example.com")])
        .with_a("mx.example.com", [192, 0, 2, 10])
}

fn verifier<'a>(
    config: VerifierConfig,
    dns: &'a StubDns,
    probe: &'a StubProbe,
) -> Verifier<&'a StubDns, &'a StubProbe> {
    Verifier::new(config, dns, probe)
}

#[test]
fn accepted_recipient_is_verified() {
    let (dns, probe) = (stub_dns(), StubProbe::replying(250, "2.1.5 Ok"));
    let verification = verifier(VerifierConfig::default(), &dns, &probe)
        .verify("user@example.com")
        .expect("verified");
    assert_eq!(verification.email, "user@example.com");
    assert_eq!(verification.target.exchange, "mx.example.com");
    assert_eq!(verification.reply.map(|r| r.code), Some(250));
}

#[test]
fn other_codes_are_rejected_with_exact_code() {
    for code in [251, 252, 421, 450, 451, 550, 553] {
        let (dns, probe) = (stub_dns(), StubProbe::replying(code, "nope"));
        let err = verifier(VerifierConfig::default(), &dns, &probe)
            .verify("user@example.com")
            .expect_err("rejected");
        assert!(matches!(err, VerificationError::Rejected { .. }));
        assert_eq!(err.status_code(), Some(code));
        assert_eq!(err.is_transient(), (400..500).contains(&code));
    }
}

#[test]
fn transport_failure_carries_no_code() {
    let (dns, probe) = (stub_dns(), StubProbe::unreachable());
    let err = verifier(VerifierConfig::default(), &dns, &probe)
        .verify("user@example.com")
        .expect_err("transport");
    assert!(matches!(err, VerificationError::Other { .. }));
    assert_eq!(err.status_code(), None);
    insta::assert_snapshot!(err.to_string(), @"Other Error: I/O error: timed out");
}

#[test]
fn missing_at_sign_is_malformed_without_touching_network() {
    let (dns, probe) = (stub_dns(), StubProbe::replying(250, "Ok"));
    for input in ["user.example.com", "", "user@", "user@   "] {
        let err = verifier(VerifierConfig::default(), &dns, &probe)
            .verify(input)
            .expect_err("malformed");
        assert!(matches!(err, VerificationError::MalformedAddress(_)), "{input:?}");
    }
    assert!(dns.queries.borrow().is_empty());
    assert_eq!(probe.calls.get(), 0);
}

#[test]
fn unknown_domain_is_dns_error() {
    let dns = StubDns::new().with_mx_error("nowhere.test", LookupError::NoSuchDomain);
    let probe = StubProbe::replying(250, "Ok");
    let err = verifier(VerifierConfig::default(), &dns, &probe)
        .verify("user@nowhere.test")
        .expect_err("dns");
    assert!(matches!(err, VerificationError::Dns { ref domain, .. } if domain == "nowhere.test"));
    insta::assert_snapshot!(err.to_string(), @"DNS error for nowhere.test");
    assert_eq!(probe.calls.get(), 0);
}

#[test]
fn dns_only_never_probes() {
    let config = VerifierConfig {
        dns_only: true,
        ..VerifierConfig::default()
    };
    let (dns, probe) = (stub_dns(), StubProbe::replying(550, "no"));
    let verification = verifier(config.clone(), &dns, &probe)
        .verify("user@example.com")
        .expect("dns only");
    assert!(verification.reply.is_none());

    let missing = StubDns::new();
    let err = verifier(config, &missing, &probe)
        .verify("user@example.com")
        .expect_err("no mx");
    assert!(matches!(err, VerificationError::Dns { .. }));
    assert_eq!(probe.calls.get(), 0);
}

#[test]
fn ipv4_only_config_reaches_the_probe() {
    let dns = stub_dns().with_aaaa("mx.example.com", Ipv6Addr::LOCALHOST);
    let probe = StubProbe::replying(250, "Ok");

    verifier(VerifierConfig::default(), &dns, &probe)
        .verify("user@example.com")
        .expect("verified");
    let config = VerifierConfig {
        family: AddressFamily::Ipv4Only,
        ..VerifierConfig::default()
    };
    verifier(config, &dns, &probe)
        .verify("user@example.com")
        .expect("verified");

    let targets = probe.targets.borrow();
    assert!(targets[0].address.is_ipv6());
    assert!(targets[1].address.is_ipv4());
}

#[test]
fn domain_is_taken_after_last_at_and_idna_encoded() {
    let dns = StubDns::new()
        .with_mx("xn--bcher-kva.example", &[(10, "mx.example.com")])
        .with_a("mx.example.com", [192, 0, 2, 10]);
    let probe = StubProbe::replying(250, "Ok");
    verifier(VerifierConfig::default(), &dns, &probe)
        .verify(" \"a@b\"@Bücher.example ")
        .expect("verified");
    assert_eq!(dns.queries.borrow()[0], "MX xn--bcher-kva.example");
}

#[test]
fn repeated_verification_is_stable() {
    let (dns, probe) = (stub_dns(), StubProbe::replying(250, "Ok"));
    let verifier = verifier(VerifierConfig::default(), &dns, &probe);
    let first = verifier.verify("user@example.com").expect("first");
    let second = verifier.verify("user@example.com").expect("second");
    assert_eq!(first, second);
}

#[test]
fn rejection_messages_name_the_command() {
    let (dns, probe) = (stub_dns(), StubProbe::replying(550, "5.1.1 User unknown"));
    let err = verifier(VerifierConfig::default(), &dns, &probe)
        .verify("user@example.com")
        .expect_err("rejected");
    insta::assert_snapshot!(err.to_string(), @"RCPT TO error: 550 5.1.1 User unknown");

    let (dns, probe) = (stub_dns(), StubProbe::replying(451, "4.7.1 greylisted"));
    let err = verifier(VerifierConfig::default(), &dns, &probe)
        .verify("user@example.com")
        .expect_err("rejected");
    assert!(err.is_transient());
    insta::assert_snapshot!(err.to_string(), @"RCPT TO error: 451 4.7.1 greylisted");
}

#[test]
fn split_address_uses_last_separator() {
    assert_eq!(
        split_address("a@b@example.com").expect("split"),
        ("a@b", "example.com")
    );
    assert!(split_address("nobody").is_err());
}

#[test]
fn smtp_metacharacters_make_address_malformed() {
    let (dns, probe) = (stub_dns(), StubProbe::replying(250, "Ok"));
    for input in [
        "x>\r\nDATA\r\nSubject: hi\r\n.\r\nRCPT TO:<victim@example.com",
        "user>@example.com",
        "<user@example.com",
        "us\ter@example.com",
        "user\u{7f}@example.com",
        "user\n@example.com",
    ] {
        let err = verifier(VerifierConfig::default(), &dns, &probe)
            .verify(input)
            .expect_err("malformed");
        assert!(matches!(err, VerificationError::MalformedAddress(_)), "{input:?}");
    }
    assert!(dns.queries.borrow().is_empty());
    assert_eq!(probe.calls.get(), 0);
}
