//! Ethereum transaction owned by a job

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Legacy,
    DynamicFee,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Legacy => write!(f, "legacy"),
            TransactionType::DynamicFee => write!(f, "dynamic_fee"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(TransactionType::Legacy),
            "dynamic_fee" | "dynamicfee" => Ok(TransactionType::DynamicFee),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

/// Numeric fields are kept as strings (decimal or 0x-hex) exactly as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_fee_cap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_tip_cap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_from: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub private_for: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enclave_key: Option<String>,
}

fn overwrite(target: &mut Option<String>, patch: &Option<String>) {
    if let Some(value) = patch {
        if !value.is_empty() {
            *target = Some(value.clone());
        }
    }
}

impl EthTransaction {
    /// Field-by-field overwrite with the non-empty fields of `patch`
    pub fn merge(&mut self, patch: &EthTransaction) {
        overwrite(&mut self.hash, &patch.hash);
        overwrite(&mut self.from, &patch.from);
        overwrite(&mut self.to, &patch.to);
        overwrite(&mut self.nonce, &patch.nonce);
        overwrite(&mut self.value, &patch.value);
        overwrite(&mut self.gas_price, &patch.gas_price);
        overwrite(&mut self.gas_fee_cap, &patch.gas_fee_cap);
        overwrite(&mut self.gas_tip_cap, &patch.gas_tip_cap);
        overwrite(&mut self.gas, &patch.gas);
        overwrite(&mut self.data, &patch.data);
        overwrite(&mut self.raw, &patch.raw);
        overwrite(&mut self.private_from, &patch.private_from);
        overwrite(&mut self.privacy_group_id, &patch.privacy_group_id);
        overwrite(&mut self.enclave_key, &patch.enclave_key);
        if patch.transaction_type.is_some() {
            self.transaction_type = patch.transaction_type;
        }
        if !patch.private_for.is_empty() {
            self.private_for = patch.private_for.clone();
        }
    }

    pub fn is_dynamic_fee(&self) -> bool {
        self.transaction_type == Some(TransactionType::DynamicFee)
    }

    /// Sender as a checksummed address, if set
    pub fn sender(&self) -> Result<Option<Address>, String> {
        match self.from.as_deref() {
            None | Some("") => Ok(None),
            Some(from) => Address::from_str(from)
                .map(Some)
                .map_err(|e| format!("invalid sender address {}: {}", from, e)),
        }
    }

    /// Multiply the fee field by `1 + increment`.
    ///
    /// Applies to `gas_fee_cap` for dynamic-fee transactions and `gas_price` otherwise.
    /// The factor is scaled by 100 and applied with integer arithmetic; the value
    /// keeps its original encoding (0x-hex or decimal). Missing fees are left alone.
    pub fn bump_gas(&mut self, increment: f64) -> Result<(), String> {
        let field = if self.is_dynamic_fee() {
            &mut self.gas_fee_cap
        } else {
            &mut self.gas_price
        };

        if let Some(current) = field.as_deref().filter(|v| !v.is_empty()) {
            *field = Some(scale_quantity(current, increment)?);
        }
        Ok(())
    }
}

fn scale_quantity(value: &str, increment: f64) -> Result<String, String> {
    if !increment.is_finite() || increment < 0.0 {
        return Err(format!("invalid gas increment {}", increment));
    }

    let amount = U256::from_str(value).map_err(|e| format!("invalid quantity {}: {}", value, e))?;
    let factor = U256::from(((1.0 + increment) * 100.0).round() as u64);
    let scaled = amount
        .checked_mul(factor)
        .ok_or_else(|| format!("quantity overflow for {}", value))?
        / U256::from(100u64);

    if value.starts_with("0x") || value.starts_with("0X") {
        Ok(format!("0x{:x}", scaled))
    } else {
        Ok(scaled.to_string())
    }
}

/// Parse a decimal or 0x-hex quantity into u64
pub fn parse_quantity(value: &str) -> Option<u64> {
    U256::from_str(value.trim()).ok().and_then(|v| u64::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_legacy_gas_price() {
        let mut tx = EthTransaction {
            gas_price: Some("1000000000".to_string()),
            ..Default::default()
        };
        tx.bump_gas(0.1).unwrap();
        assert_eq!(tx.gas_price.as_deref(), Some("1100000000"));
        assert_eq!(tx.gas_fee_cap, None);
    }

    #[test]
    fn test_bump_dynamic_fee_cap_keeps_hex() {
        let mut tx = EthTransaction {
            gas_price: Some("0x64".to_string()),
            gas_fee_cap: Some("0x3e8".to_string()),
            transaction_type: Some(TransactionType::DynamicFee),
            ..Default::default()
        };
        tx.bump_gas(0.25).unwrap();
        assert_eq!(tx.gas_fee_cap.as_deref(), Some("0x4e2"));
        assert_eq!(tx.gas_price.as_deref(), Some("0x64"));
    }

    #[test]
    fn test_bump_rejects_garbage() {
        let mut tx = EthTransaction {
            gas_price: Some("lots".to_string()),
            ..Default::default()
        };
        assert!(tx.bump_gas(0.1).is_err());
        assert!(EthTransaction::default().bump_gas(-1.0).is_ok());
    }

    #[test]
    fn test_merge_only_non_empty_fields() {
        let mut stored = EthTransaction {
            from: Some("0x905B88EFf8Bda1543d4d6f4aA05afef143D27E18".to_string()),
            nonce: Some("1".to_string()),
            gas: Some("21000".to_string()),
            ..Default::default()
        };
        let patch = EthTransaction {
            nonce: Some("2".to_string()),
            gas: Some(String::new()),
            hash: Some("0xabc".to_string()),
            ..Default::default()
        };
        stored.merge(&patch);

        assert_eq!(stored.nonce.as_deref(), Some("2"));
        assert_eq!(stored.gas.as_deref(), Some("21000"));
        assert_eq!(stored.hash.as_deref(), Some("0xabc"));
        assert!(stored.from.is_some());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("21000"), Some(21000));
        assert_eq!(parse_quantity("0x5208"), Some(21000));
        assert_eq!(parse_quantity("nope"), None);
    }

    #[test]
    fn test_sender_validation() {
        let tx = EthTransaction {
            from: Some("0xnot-an-address".to_string()),
            ..Default::default()
        };
        assert!(tx.sender().is_err());
        assert_eq!(EthTransaction::default().sender().unwrap(), None);
    }
}
