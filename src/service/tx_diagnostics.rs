// service/tx_diagnostics.rs
//
// Fallback path: pull an encoded TransactionResult back out of a free-text
// failure message. Nothing here may fail the caller; decode problems end up
// in `decode_error`.
use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use stellar_xdr::curr::{
    InnerTransactionResultResult, Limits, OperationResult, OperationResultTr, ReadXdr,
    TransactionResult, TransactionResultResult,
};

use crate::models::vaccinemodel::{IssuanceOutcome, TxDiagnostic};

const ENCODED_BLOB_PATTERN: &str = r#"["']([A-Za-z0-9+/=]{16,})["']"#;

/// Tagged failure carrying the raw message and whatever could be decoded from it.
pub fn failure_outcome(message: String) -> IssuanceOutcome {
    let diagnostic = diagnose(&message);
    IssuanceOutcome::Error { message, diagnostic }
}

/// `None` when the message has no quoted base64 candidate at all.
pub fn diagnose(message: &str) -> Option<TxDiagnostic> {
    let pattern = match Regex::new(ENCODED_BLOB_PATTERN) {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::warn!("Diagnostic pattern failed to compile: {}", e);
            return None;
        }
    };

    let candidates: Vec<&str> = pattern
        .captures_iter(message)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let mut last_error = String::new();
    for candidate in candidates {
        match decode_result(candidate) {
            Ok(result) => return Some(describe(&result)),
            Err(e) => last_error = e,
        }
    }

    Some(TxDiagnostic {
        decode_error: Some(last_error),
        ..Default::default()
    })
}

fn decode_result(candidate: &str) -> Result<TransactionResult, String> {
    let bytes = STANDARD
        .decode(candidate)
        .map_err(|e| format!("base64: {}", e))?;
    TransactionResult::from_xdr(bytes, Limits::none()).map_err(|e| format!("xdr: {}", e))
}

fn describe(result: &TransactionResult) -> TxDiagnostic {
    let operation_results = match &result.result {
        TransactionResultResult::TxSuccess(ops) | TransactionResultResult::TxFailed(ops) => {
            ops.iter().map(operation_code).collect()
        }
        TransactionResultResult::TxFeeBumpInnerSuccess(pair)
        | TransactionResultResult::TxFeeBumpInnerFailed(pair) => match &pair.result.result {
            InnerTransactionResultResult::TxSuccess(ops)
            | InnerTransactionResultResult::TxFailed(ops) => ops.iter().map(operation_code).collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    TxDiagnostic {
        fee_charged: Some(result.fee_charged),
        result_code: Some(result.result.name().to_string()),
        operation_results,
        decode_error: None,
    }
}

fn operation_code(op: &OperationResult) -> String {
    match op {
        OperationResult::OpInner(tr) => {
            let detail = match tr {
                OperationResultTr::Payment(r) => Some(r.name()),
                OperationResultTr::ChangeTrust(r) => Some(r.name()),
                OperationResultTr::InvokeHostFunction(r) => Some(r.name()),
                _ => None,
            };
            match detail {
                Some(detail) => format!("{}.{}", tr.name(), detail),
                None => tr.name().to_string(),
            }
        }
        other => other.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use stellar_xdr::curr::{
        ChangeTrustResult, PaymentResult, TransactionResultExt, WriteXdr,
    };

    use super::*;

    fn failed_payment_xdr() -> String {
        TransactionResult {
            fee_charged: 100,
            result: TransactionResultResult::TxFailed(
                vec![
                    OperationResult::OpInner(OperationResultTr::ChangeTrust(ChangeTrustResult::Success)),
                    OperationResult::OpInner(OperationResultTr::Payment(PaymentResult::Underfunded)),
                ]
                .try_into()
                .unwrap(),
            ),
            ext: TransactionResultExt::V0,
        }
        .to_xdr_base64(Limits::none())
        .unwrap()
    }

    #[test]
    fn test_decodes_quoted_result_xdr() {
        let message = format!(
            "Transaction Failed: result_codes={{\"transaction\":\"tx_failed\"}}, result_xdr=\"{}\"",
            failed_payment_xdr()
        );
        let diagnostic = diagnose(&message).unwrap();
        assert_eq!(diagnostic.fee_charged, Some(100));
        assert_eq!(diagnostic.result_code.as_deref(), Some("TxFailed"));
        assert_eq!(
            diagnostic.operation_results,
            vec!["ChangeTrust.Success".to_string(), "Payment.Underfunded".to_string()]
        );
        assert!(diagnostic.decode_error.is_none());
    }

    #[test]
    fn test_single_quotes_are_accepted() {
        let message = format!("host error: '{}'", failed_payment_xdr());
        assert_eq!(diagnose(&message).unwrap().fee_charged, Some(100));
    }

    #[test]
    fn test_undecodable_candidate_reports_decode_error() {
        let diagnostic = diagnose("rejected: \"QUJDREVGR0hJSktMTU5PUA==\"").unwrap();
        assert!(diagnostic.fee_charged.is_none());
        assert!(diagnostic.operation_results.is_empty());
        assert!(diagnostic.decode_error.is_some());
    }

    #[test]
    fn test_no_candidate_means_no_diagnostic() {
        assert!(diagnose("connection refused").is_none());
        assert!(diagnose("short \"abc\" token").is_none());
    }

    #[test]
    fn test_failure_outcome_keeps_raw_message() {
        match failure_outcome("Account GABC was not found on the network".to_string()) {
            IssuanceOutcome::Error { message, diagnostic } => {
                assert_eq!(message, "Account GABC was not found on the network");
                assert!(diagnostic.is_none());
            }
            other => panic!("expected error outcome, got {:?}", other),
        }
    }
}
