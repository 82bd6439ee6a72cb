//! # Lightning payment requests (BOLT11)
//!
//! Parsing and signature checks are done by `lightning-invoice`. This module
//! keeps only what a renderer needs: network, amount, timestamp, payment
//! hash, description, payee and expiry.

use std::str::FromStr;

use lightning_invoice::{Bolt11Invoice, Bolt11InvoiceDescriptionRef, Currency};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    #[error("invalid payment request: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Network {
    Bitcoin,
    Testnet,
    Signet,
    Regtest,
    Simnet,
}

impl From<Currency> for Network {
    fn from(currency: Currency) -> Self {
        match currency {
            Currency::Bitcoin => Network::Bitcoin,
            Currency::BitcoinTestnet => Network::Testnet,
            Currency::Signet => Network::Signet,
            Currency::Regtest => Network::Regtest,
            Currency::Simnet => Network::Simnet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    pub network: Network,
    /// `None` for invoices that let the payer choose the amount.
    pub amount_msat: Option<u64>,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub payment_hash: String,
    pub description: Option<String>,
    pub description_hash: Option<String>,
    /// Compressed public key of the node that signed the invoice.
    pub payee: String,
    /// Seconds after `timestamp`.
    pub expiry: u64,
}

impl Invoice {
    pub fn amount_sats(&self) -> Option<u64> {
        self.amount_msat.map(|msat| msat / 1000)
    }

    pub fn expires_at(&self) -> u64 {
        self.timestamp.saturating_add(self.expiry)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at()
    }
}

impl From<&Bolt11Invoice> for Invoice {
    fn from(invoice: &Bolt11Invoice) -> Self {
        let (description, description_hash) = match invoice.description() {
            Bolt11InvoiceDescriptionRef::Direct(text) => (Some(text.to_string()), None),
            Bolt11InvoiceDescriptionRef::Hash(hash) => (None, Some(hash.0.to_string())),
        };
        let payee = invoice
            .payee_pub_key()
            .copied()
            .unwrap_or_else(|| invoice.recover_payee_pub_key());
        Self {
            network: invoice.currency().into(),
            amount_msat: invoice.amount_milli_satoshis(),
            timestamp: invoice.duration_since_epoch().as_secs(),
            payment_hash: invoice.payment_hash().to_string(),
            description,
            description_hash,
            payee: payee.to_string(),
            expiry: invoice.expiry_time().as_secs(),
        }
    }
}

/// Parses a payment request and verifies its signature. Either case is
/// accepted.
pub fn decode(s: &str) -> Result<Invoice, InvoiceError> {
    let invoice =
        Bolt11Invoice::from_str(&s.to_ascii_lowercase()).map_err(|e| InvoiceError::Invalid(e.to_string()))?;
    Ok(Invoice::from(&invoice))
}
