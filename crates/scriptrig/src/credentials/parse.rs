//! Parsing of the admin `add` output.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Credential;
use super::error::ProvisioningError;

static PRINCIPAL_ID_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Account ID: (\d+)\s*$").expect("valid regex"));
static SECRET_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Account secret: (\S.*?)\s*$").expect("valid regex"));

/// Extracts the principal id and secret from `add` output.
pub(super) fn parse_add_output(stdout: &str, address: &str) -> Result<Credential, ProvisioningError> {
    let principal_id = capture(&PRINCIPAL_ID_LINE, stdout).ok_or_else(|| {
        ProvisioningError::MissingField {
            field: "account id",
            address: address.to_owned(),
        }
    })?;
    let secret =
        capture(&SECRET_LINE, stdout).ok_or_else(|| ProvisioningError::MissingField {
            field: "account secret",
            address: address.to_owned(),
        })?;
    Ok(Credential::new(principal_id, secret))
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().to_owned())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_both_fields() {
        let stdout = "Account ID: 42\nAccount secret: s3cr3t/+=\n";
        let credential = parse_add_output(stdout, "a@b").expect("parse");
        assert_eq!(credential.principal_id(), "42");
        assert_eq!(credential.secret(), "s3cr3t/+=");
    }

    #[test]
    fn tolerates_surrounding_noise_and_crlf() {
        let stdout = "creating account...\r\nAccount ID: 7\r\nAccount secret: abc\r\ndone\r\n";
        let credential = parse_add_output(stdout, "a@b").expect("parse");
        assert_eq!(credential.principal_id(), "7");
        assert_eq!(credential.secret(), "abc");
    }

    #[rstest]
    #[case("Account secret: abc\n", "account id")]
    #[case("Account ID: not-a-number\nAccount secret: abc\n", "account id")]
    #[case("Account ID: 42\n", "account secret")]
    #[case("Account ID: 42\nAccount secret:   \n", "account secret")]
    fn missing_fields_are_reported(#[case] stdout: &str, #[case] expected: &str) {
        match parse_add_output(stdout, "someone@scriptrig.test") {
            Err(ProvisioningError::MissingField { field, address }) => {
                assert_eq!(field, expected);
                assert_eq!(address, "someone@scriptrig.test");
            }
            other => panic!("expected MissingField, got: {other:?}"),
        }
    }
}
