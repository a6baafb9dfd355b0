// service/stellar_tx.rs
//
// Transaction construction and signing. Nothing in here touches the network.
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    AccountId, AlphaNum12, AlphaNum4, Asset, AssetCode12, AssetCode4, ChangeTrustAsset,
    ChangeTrustOp, Hash, HostFunction, InvokeContractArgs, InvokeHostFunctionOp, Limits, Memo,
    MuxedAccount, Operation, OperationBody, PaymentOp, Preconditions, ReadXdr, ScAddress, ScString,
    ScSymbol, ScVal, SequenceNumber, SorobanAuthorizationEntry, SorobanTransactionData, StringM,
    TimeBounds, TimePoint, Transaction, TransactionEnvelope, TransactionExt,
    TransactionMeta, TransactionSignaturePayload, TransactionSignaturePayloadTaggedTransaction,
    TransactionV1Envelope, VecM, WriteXdr,
};

use crate::service::{error::ChainError, stellar_keys::Keypair};

/// Minimum fee per operation, in stroops.
pub const BASE_FEE: u32 = 100;
pub const TX_TIMEOUT_SECS: u64 = 30;
/// One whole unit of a classic asset (7 decimal places).
pub const ONE_UNIT: i64 = 10_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    pub envelope_xdr: String,
    pub hash: String,
}

pub fn network_id(passphrase: &str) -> Hash {
    Hash(sha256(passphrase.as_bytes()))
}

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

pub fn credit_asset(code: &str, issuer: AccountId) -> Result<Asset, ChainError> {
    if code.is_empty() || code.len() > 12 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ChainError::InvalidAsset(format!(
            "asset code {:?} must be 1-12 letters or digits",
            code
        )));
    }

    if code.len() <= 4 {
        let mut bytes = [0u8; 4];
        bytes[..code.len()].copy_from_slice(code.as_bytes());
        Ok(Asset::CreditAlphanum4(AlphaNum4 {
            asset_code: AssetCode4(bytes),
            issuer,
        }))
    } else {
        let mut bytes = [0u8; 12];
        bytes[..code.len()].copy_from_slice(code.as_bytes());
        Ok(Asset::CreditAlphanum12(AlphaNum12 {
            asset_code: AssetCode12(bytes),
            issuer,
        }))
    }
}

/// Trust line for `asset`, executed by `source` rather than the transaction's source account.
pub fn change_trust_op(asset: &Asset, source: MuxedAccount) -> Result<Operation, ChainError> {
    let line = match asset {
        Asset::CreditAlphanum4(a) => ChangeTrustAsset::CreditAlphanum4(a.clone()),
        Asset::CreditAlphanum12(a) => ChangeTrustAsset::CreditAlphanum12(a.clone()),
        Asset::Native => {
            return Err(ChainError::InvalidAsset("cannot trust the native asset".to_string()))
        }
    };

    Ok(Operation {
        source_account: Some(source),
        body: OperationBody::ChangeTrust(ChangeTrustOp {
            line,
            limit: i64::MAX,
        }),
    })
}

pub fn payment_op(asset: Asset, destination: MuxedAccount, amount: i64) -> Operation {
    Operation {
        source_account: None,
        body: OperationBody::Payment(PaymentOp {
            destination,
            asset,
            amount,
        }),
    }
}

pub fn sc_string(value: &str) -> Result<ScVal, ChainError> {
    let s: StringM = StringM::try_from(value.as_bytes().to_vec())?;
    Ok(ScVal::String(ScString(s)))
}

pub fn sc_account(account: AccountId) -> ScVal {
    ScVal::Address(ScAddress::Account(account))
}

pub fn invoke_contract_op(
    contract_id: &str,
    function: &str,
    args: Vec<ScVal>,
) -> Result<Operation, ChainError> {
    let contract = stellar_strkey::Contract::from_string(contract_id).map_err(|_| {
        ChainError::InvalidAsset(format!("invalid contract id {}", contract_id))
    })?;

    Ok(Operation {
        source_account: None,
        body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
            host_function: HostFunction::InvokeContract(InvokeContractArgs {
                contract_address: ScAddress::Contract(Hash(contract.0)),
                function_name: ScSymbol(StringM::try_from(function.as_bytes().to_vec())?),
                args: args.try_into()?,
            }),
            auth: VecM::default(),
        }),
    })
}

pub fn build_transaction(
    source: MuxedAccount,
    sequence: i64,
    operations: Vec<Operation>,
    now_unix: u64,
) -> Result<Transaction, ChainError> {
    let fee = BASE_FEE.saturating_mul(operations.len() as u32);

    Ok(Transaction {
        source_account: source,
        fee,
        seq_num: SequenceNumber(sequence),
        cond: Preconditions::Time(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(now_unix + TX_TIMEOUT_SECS),
        }),
        memo: Memo::None,
        operations: operations.try_into()?,
        ext: TransactionExt::V0,
    })
}

/// Folds a `simulateTransaction` answer into the transaction: resource footprint,
/// authorization entries and the extra resource fee.
pub fn apply_simulation(
    mut tx: Transaction,
    transaction_data: &str,
    auth: &[String],
    min_resource_fee: u32,
) -> Result<Transaction, ChainError> {
    let data = SorobanTransactionData::from_xdr_base64(transaction_data, Limits::none())?;
    let auth_entries = auth
        .iter()
        .map(|entry| SorobanAuthorizationEntry::from_xdr_base64(entry, Limits::none()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut operations = tx.operations.to_vec();
    for op in operations.iter_mut() {
        if let OperationBody::InvokeHostFunction(invoke) = &mut op.body {
            invoke.auth = auth_entries.clone().try_into()?;
        }
    }

    tx.operations = operations.try_into()?;
    tx.fee = tx.fee.saturating_add(min_resource_fee);
    tx.ext = TransactionExt::V1(data);
    Ok(tx)
}

pub fn transaction_hash(tx: &Transaction, network_id: &Hash) -> Result<[u8; 32], ChainError> {
    let payload = TransactionSignaturePayload {
        network_id: network_id.clone(),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    };
    let bytes = payload.to_xdr(Limits::none())?;
    Ok(sha256(&bytes))
}

pub fn sign_transaction(
    tx: Transaction,
    network_id: &Hash,
    signers: &[&Keypair],
) -> Result<SignedTransaction, ChainError> {
    let hash = transaction_hash(&tx, network_id)?;

    let signatures = signers
        .iter()
        .map(|signer| signer.sign_decorated(&hash))
        .collect::<Result<Vec<_>, _>>()?;

    let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
        tx,
        signatures: signatures.try_into()?,
    });

    Ok(SignedTransaction {
        envelope_xdr: envelope.to_xdr_base64(Limits::none())?,
        hash: hex::encode(hash),
    })
}

/// Reads the `u128` a contract call returned out of the confirmed transaction's metadata.
pub fn token_id_from_meta(result_meta_xdr: &str) -> Option<u128> {
    let meta = TransactionMeta::from_xdr_base64(result_meta_xdr, Limits::none()).ok()?;
    let return_value = match meta {
        TransactionMeta::V3(v3) => v3.soroban_meta?.return_value,
        _ => return None,
    };

    match return_value {
        ScVal::U128(parts) => Some(((parts.hi as u128) << 64) | parts.lo as u128),
        _ => None,
    }
}
