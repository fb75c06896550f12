use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaKind {
    Percent,
    Absolute,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaSign {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

/// A signed price adjustment. Percent deltas accumulate into one percentage
/// applied multiplicatively to the base price; absolute deltas accumulate
/// into a flat amount added after the percentage is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub kind: DeltaKind,
    pub sign: DeltaSign,
    pub value: Decimal,
}

impl Delta {
    pub fn zero() -> Self {
        Self { kind: DeltaKind::Absolute, sign: DeltaSign::Plus, value: Decimal::ZERO }
    }

    pub fn percent(sign: DeltaSign, value: Decimal) -> Self {
        Self { kind: DeltaKind::Percent, sign, value }
    }

    pub fn absolute(sign: DeltaSign, value: Decimal) -> Self {
        Self { kind: DeltaKind::Absolute, sign, value }
    }

    /// The delta value with its sign applied.
    pub fn signed_value(&self) -> Decimal {
        match self.sign {
            DeltaSign::Plus => self.value,
            DeltaSign::Minus => -self.value,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }
}

impl Default for Delta {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Delta, DeltaKind, DeltaSign};

    #[test]
    fn signed_value_honors_sign() {
        let up = Delta::absolute(DeltaSign::Plus, Decimal::from(500));
        let down = Delta::percent(DeltaSign::Minus, Decimal::from(10));

        assert_eq!(up.signed_value(), Decimal::from(500));
        assert_eq!(down.signed_value(), Decimal::from(-10));
    }

    #[test]
    fn zero_delta_is_inert() {
        let zero = Delta::zero();
        assert!(zero.is_zero());
        assert_eq!(zero.signed_value(), Decimal::ZERO);
    }

    #[test]
    fn wire_shape_uses_snake_case_kind_and_symbolic_sign() {
        let delta = Delta::percent(DeltaSign::Minus, Decimal::from(10));
        let json = serde_json::to_string(&delta).expect("serialize delta");
        assert_eq!(json, r#"{"kind":"percent","sign":"-","value":"10"}"#);

        let parsed: Delta = serde_json::from_str(&json).expect("deserialize delta");
        assert_eq!(parsed, delta);
        assert_eq!(parsed.kind, DeltaKind::Percent);
    }
}
