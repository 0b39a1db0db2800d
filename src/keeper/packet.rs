//! Cross-chain swap packets.
//!
//! The transport layer delivers the raw JSON payload and has already
//! credited `sender` on this chain with the tokens being swapped. The
//! engine only checks what the payload means: its type, the pool, the
//! denoms and the amounts. Delivery, ordering and replay protection stay
//! with the transport.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Engine;
use super::swap::check_deadline;
use super::tx::SwapLeg;
use crate::domain::{Address, Amount, Denom, PoolId, SwapQuote};
use crate::error::AmmError;
use crate::traits::{Bank, BlockClock, ParamSource};

/// `type` tag of a swap packet.
pub const SWAP_PACKET_TYPE: &str = "execute_swap";

/// Payload of a cross-chain swap request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapPacket {
    /// Must equal [`SWAP_PACKET_TYPE`].
    #[serde(rename = "type")]
    pub packet_type: String,
    /// Pool to swap against.
    pub pool_id: PoolId,
    /// Denom paid in.
    pub token_in: Denom,
    /// Denom paid out.
    pub token_out: Denom,
    /// Exact input.
    pub amount_in: Amount,
    /// Least acceptable output.
    #[serde(default)]
    pub min_amount_out: Amount,
    /// Local account funding the swap.
    pub sender: Address,
    /// Local account receiving the output.
    pub receiver: Address,
    /// Unix deadline; zero for none.
    #[serde(default)]
    pub timeout: u64,
}

/// Result of a swap packet, returned to the sending chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapAcknowledgement {
    /// Whether the swap executed.
    pub success: bool,
    /// Output paid to the receiver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_out: Option<Amount>,
    /// Fee charged on the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_fee: Option<Amount>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SwapAcknowledgement {
    /// Acknowledges an executed swap.
    #[must_use]
    pub const fn success(quote: &SwapQuote) -> Self {
        Self {
            success: true,
            amount_out: Some(quote.amount_out()),
            swap_fee: Some(quote.fee()),
            error: None,
        }
    }

    /// Acknowledges a rejected packet.
    #[must_use]
    pub fn failure(err: &AmmError) -> Self {
        Self {
            success: false,
            amount_out: None,
            swap_fee: None,
            error: Some(err.to_string()),
        }
    }

    /// Encodes the acknowledgement as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidPacket`] if encoding fails.
    pub fn to_bytes(&self) -> crate::error::Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| AmmError::InvalidPacket(e.to_string()))
    }

    /// Decodes an acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidPacket`] for malformed JSON.
    pub fn from_bytes(bytes: &[u8]) -> crate::error::Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| AmmError::InvalidPacket(e.to_string()))
    }
}

impl<B: Bank, C: BlockClock, P: ParamSource> Engine<B, C, P> {
    /// Decodes a swap packet and checks it against the current state.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidPacket`] for malformed JSON, a wrong `type`,
    ///   empty accounts, a zero amount, equal denoms, or denoms that are
    ///   not the pool's pair.
    /// - [`AmmError::PoolNotFound`].
    pub fn validate_swap_packet(&self, payload: &[u8]) -> crate::error::Result<SwapPacket> {
        let packet: SwapPacket = serde_json::from_slice(payload)
            .map_err(|e| AmmError::InvalidPacket(format!("malformed payload: {e}")))?;
        if packet.packet_type != SWAP_PACKET_TYPE {
            return Err(AmmError::InvalidPacket(format!(
                "unexpected packet type {:?}",
                packet.packet_type
            )));
        }
        if packet.sender.is_empty() || packet.receiver.is_empty() {
            return Err(AmmError::InvalidPacket("sender and receiver are required".into()));
        }
        if packet.amount_in.is_zero() {
            return Err(AmmError::InvalidPacket("amount in must be positive".into()));
        }
        if packet.token_in == packet.token_out {
            return Err(AmmError::InvalidPacket("token in and token out are equal".into()));
        }
        let pair = self.state.pools.get(packet.pool_id)?.pair();
        if !pair.contains(&packet.token_in) || !pair.contains(&packet.token_out) {
            return Err(AmmError::InvalidPacket(format!(
                "pool {} does not trade {}/{}",
                packet.pool_id, packet.token_in, packet.token_out
            )));
        }
        Ok(packet)
    }

    /// Executes a swap packet and builds its acknowledgement.
    ///
    /// Every failure, from decoding to settlement, becomes an error
    /// acknowledgement and leaves state untouched.
    pub fn on_recv_swap_packet(&mut self, payload: &[u8]) -> SwapAcknowledgement {
        match self.execute_swap_packet(payload) {
            Ok(quote) => SwapAcknowledgement::success(&quote),
            Err(err) => {
                warn!(error = %err, "swap packet rejected");
                SwapAcknowledgement::failure(&err)
            }
        }
    }

    fn execute_swap_packet(&mut self, payload: &[u8]) -> crate::error::Result<SwapQuote> {
        let packet = self.validate_swap_packet(payload)?;
        check_deadline(packet.timeout, self.block.time)?;
        let quote = self.atomic("swap_packet", |tx| {
            tx.swap_leg(SwapLeg {
                pool_id: packet.pool_id,
                denom_in: &packet.token_in,
                amount_in: packet.amount_in,
                payer: &packet.sender,
                recipient: &packet.receiver,
                min_out: packet.min_amount_out,
                gated: true,
            })
        })?;
        info!(
            pool_id = %packet.pool_id,
            sender = %packet.sender,
            receiver = %packet.receiver,
            amount_out = %quote.amount_out(),
            "swap packet executed"
        );
        Ok(quote)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::super::testing::{START_TIME, TestEngine, bob, denom, engine, pool};
    use super::*;

    fn payload(value: &serde_json::Value) -> Vec<u8> {
        value.to_string().into_bytes()
    }

    fn packet_json() -> serde_json::Value {
        json!({
            "type": "execute_swap",
            "pool_id": 1,
            "token_in": "atom",
            "token_out": "osmo",
            "amount_in": "1000",
            "min_amount_out": "1900",
            "sender": "bob",
            "receiver": "dave"
        })
    }

    fn setup() -> TestEngine {
        let mut engine = engine();
        pool(&mut engine, "atom", "osmo", 1_000_000, 2_000_000);
        engine
    }

    #[test]
    fn valid_packet_swaps_to_receiver() {
        let mut engine = setup();
        let ack = engine.on_recv_swap_packet(&payload(&packet_json()));
        assert!(ack.success, "{ack:?}");
        assert_eq!(ack.amount_out, Some(Amount::new(1_992)));
        assert_eq!(ack.swap_fee, Some(Amount::new(3)));
        assert_eq!(
            engine.bank().balance(&Address::new("dave"), &denom("osmo")),
            Amount::new(1_992)
        );
    }

    #[test]
    fn semantic_rejections() {
        let engine = setup();
        let cases = [
            ("type", json!("query_pools")),
            ("amount_in", json!("0")),
            ("token_out", json!("atom")),
            ("token_out", json!("usdc")),
            ("receiver", json!("")),
        ];
        for (field, value) in cases {
            let mut packet = packet_json();
            packet[field] = value;
            assert!(
                matches!(
                    engine.validate_swap_packet(&payload(&packet)),
                    Err(AmmError::InvalidPacket(_))
                ),
                "{field} should be rejected"
            );
        }
        assert!(matches!(
            engine.validate_swap_packet(b"not json"),
            Err(AmmError::InvalidPacket(_))
        ));
        let mut missing = packet_json();
        missing["pool_id"] = json!(42);
        assert_eq!(
            engine.validate_swap_packet(&payload(&missing)),
            Err(AmmError::PoolNotFound(PoolId::new(42)))
        );
    }

    #[test]
    fn failed_execution_acknowledges_error() {
        let mut engine = setup();
        let state = engine.state().clone();
        let mut packet = packet_json();
        packet["min_amount_out"] = json!("5000");
        let ack = engine.on_recv_swap_packet(&payload(&packet));
        assert!(!ack.success);
        assert!(ack.amount_out.is_none());
        assert!(ack.error.is_some());
        assert_eq!(engine.state(), &state);

        let mut late = packet_json();
        late["timeout"] = json!(START_TIME - 1);
        assert!(!engine.on_recv_swap_packet(&payload(&late)).success);

        let mut unfunded = packet_json();
        unfunded["sender"] = json!("erin");
        assert!(!engine.on_recv_swap_packet(&payload(&unfunded)).success);
        assert_eq!(engine.bank().balance(&bob(), &denom("atom")).get(), 1_000_000_000_000);
    }

    #[test]
    fn acknowledgement_json_omits_empty_fields() {
        let ack = SwapAcknowledgement::failure(&AmmError::ZeroAmount);
        let Ok(bytes) = ack.to_bytes() else {
            panic!("expected Ok");
        };
        let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("expected Ok");
        };
        assert_eq!(value, json!({"success": false, "error": "amount must be positive"}));
        assert_eq!(SwapAcknowledgement::from_bytes(&bytes), Ok(ack));
    }
}
