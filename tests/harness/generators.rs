// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for abuse simulation.

use portfolio_contact::Submission;
use std::net::{IpAddr, Ipv4Addr};

/// Shape of the payloads an attack sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Valid,
    MissingFields,
    BadEmail,
}

/// Generate a pool of client addresses.
pub fn generate_clients(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c)).to_string()
        })
        .collect()
}

/// Build the i-th submission of the given kind.
pub fn generate_submission(index: usize, kind: PayloadKind) -> Submission {
    let name = format!("Visitor {index}");
    let email = format!("visitor{index}@example.com");
    let message = format!("Hello, this is message number {index}.");

    match kind {
        PayloadKind::Valid => Submission::new(name, email, message),
        PayloadKind::MissingFields => Submission {
            message: None,
            ..Submission::new(name, email, message)
        },
        PayloadKind::BadEmail => {
            let emails = generate_malformed_emails();
            Submission::new(name, emails[index % emails.len()], message)
        }
    }
}

/// Addresses that must fail the email shape check.
pub fn generate_malformed_emails() -> Vec<&'static str> {
    vec![
        "foo",
        "foo@bar",
        "@bar.com",
        "foo@",
        "foo@bar.",
        "foo bar@baz.com",
        "foo@ba r.com",
        "foo@@bar.com",
        "foo@bar@baz.com",
        "\tfoo@bar.com",
    ]
}

/// Submissions missing at least one required field.
pub fn generate_incomplete_submissions() -> Vec<Submission> {
    let full = Submission::new("Jane", "jane@x.com", "hi");
    vec![
        Submission::default(),
        Submission {
            name: None,
            ..full.clone()
        },
        Submission {
            email: None,
            ..full.clone()
        },
        Submission {
            message: None,
            ..full.clone()
        },
        Submission {
            name: Some("   ".into()),
            ..full.clone()
        },
        Submission {
            email: Some(String::new()),
            ..full.clone()
        },
        Submission {
            message: Some("\n\t".into()),
            ..full
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_clients() {
        let clients = generate_clients(256);
        assert_eq!(clients.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = clients.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_generate_submission_kinds() {
        assert!(generate_submission(1, PayloadKind::Valid).message.is_some());
        assert!(generate_submission(1, PayloadKind::MissingFields).message.is_none());
    }
}
