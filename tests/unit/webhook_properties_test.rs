use proptest::prelude::*;

use datatrans_gateway::models::requests::InitRequest;
use datatrans_gateway::models::{Amount, Currency, TransactionStatus};
use datatrans_gateway::WebhookVerifier;

const NOW: i64 = 1_700_000_000_000;

fn currency() -> impl Strategy<Value = Currency> {
    proptest::sample::select(Currency::ALL.to_vec())
}

fn status() -> impl Strategy<Value = TransactionStatus> {
    use TransactionStatus::*;
    proptest::sample::select(vec![
        Initialized,
        Authenticated,
        Authorized,
        Settled,
        Transmitted,
        Canceled,
        Failed,
        Refunded,
        Compensated,
    ])
}

proptest! {
    #[test]
    fn serialized_amount_is_the_minor_unit_input(
        minor in 1u64..=u64::MAX,
        currency in currency(),
    ) {
        let request = InitRequest::new(Amount::new(minor).unwrap(), currency, "order-1");
        let body = serde_json::to_value(&request).unwrap();
        prop_assert_eq!(body["amount"].as_u64(), Some(minor));
        prop_assert_eq!(body["currency"].as_str(), Some(currency.as_str()));
    }

    #[test]
    fn correct_key_and_body_verify(
        key in proptest::collection::vec(any::<u8>(), 1..64),
        body in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let verifier = WebhookVerifier::new(key);
        let header = verifier.signature_header(NOW, &body).unwrap();
        prop_assert!(verifier.verify_at(&header, &body, NOW).is_ok());
    }

    #[test]
    fn any_body_byte_flip_fails(
        body in proptest::collection::vec(any::<u8>(), 1..512),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let verifier = WebhookVerifier::new(b"s3cret".to_vec());
        let header = verifier.signature_header(NOW, &body).unwrap();

        let mut tampered = body.clone();
        let i = index.index(tampered.len());
        tampered[i] ^= flip;

        prop_assert!(verifier.verify_at(&header, &tampered, NOW).is_err());
    }

    #[test]
    fn any_signature_byte_flip_fails(
        body in proptest::collection::vec(any::<u8>(), 0..256),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let verifier = WebhookVerifier::new(b"s3cret".to_vec());
        let signature = verifier.sign(NOW, &body).unwrap();

        let mut digest = hex::decode(&signature).unwrap();
        let i = index.index(digest.len());
        digest[i] ^= flip;
        let header = format!("t={},s0={}", NOW, hex::encode(digest));

        prop_assert!(verifier.verify_at(&header, &body, NOW).is_err());
    }

    #[test]
    fn any_signature_text_change_fails(
        body in proptest::collection::vec(any::<u8>(), 0..256),
        index in any::<prop::sample::Index>(),
        replacement in proptest::char::range('0', 'z'),
    ) {
        let verifier = WebhookVerifier::new(b"s3cret".to_vec());
        let mut signature: Vec<char> = verifier.sign(NOW, &body).unwrap().chars().collect();
        let i = index.index(signature.len());
        prop_assume!(signature[i] != replacement);
        signature[i] = replacement;

        let header = format!("t={},s0={}", NOW, signature.into_iter().collect::<String>());
        prop_assert!(verifier.verify_at(&header, &body, NOW).is_err());
    }

    #[test]
    fn uppercasing_a_signature_letter_fails(
        body in proptest::collection::vec(any::<u8>(), 0..256),
        index in any::<prop::sample::Index>(),
    ) {
        let verifier = WebhookVerifier::new(b"s3cret".to_vec());
        let signature = verifier.sign(NOW, &body).unwrap();
        let letters: Vec<usize> = signature
            .char_indices()
            .filter(|(_, c)| c.is_ascii_lowercase())
            .map(|(i, _)| i)
            .collect();
        prop_assume!(!letters.is_empty());

        let i = letters[index.index(letters.len())];
        let mut tampered = signature.clone();
        tampered.replace_range(i..=i, &signature[i..=i].to_ascii_uppercase());

        let header = format!("t={},s0={}", NOW, tampered);
        prop_assert!(verifier.verify_at(&header, &body, NOW).is_err());
    }

    #[test]
    fn status_never_regresses(from in status(), to in status()) {
        if from.can_transition_to(to) && from != to {
            prop_assert!(to.rank() > from.rank());
            prop_assert!(!from.is_terminal());
        }
    }
}

#[test]
fn settled_example_verifies_and_deadbeef_fails() {
    let verifier = WebhookVerifier::new(b"s3cret".to_vec());
    let body = br#"{"status":"settled"}"#;

    let header = verifier.signature_header(NOW, body).unwrap();
    assert!(verifier.verify_at(&header, body, NOW).is_ok());

    let forged = format!("t={},s0=deadbeef", NOW);
    let err = verifier.verify_at(&forged, body, NOW).unwrap_err();
    assert!(matches!(
        err,
        datatrans_gateway::DatatransError::Authentication { .. }
    ));
}
